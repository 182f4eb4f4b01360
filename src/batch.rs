//! Batch driver
//!
//! Discovers the drawings to convert, mirrors their folder layout under the
//! output root, and runs each through the selected [`FileConverter`]. A
//! failing file is recorded and the batch moves on.

use crate::error::{Result, ResultExt};
use crate::pipeline::FileConverter;
use crate::progress::ProgressTracker;
use indicatif::ProgressBar;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extension of the drawings picked up by discovery, compared case-insensitively
pub const INPUT_EXTENSION: &str = "dwg";

/// A drawing that failed to convert
#[derive(Debug, Clone, PartialEq)]
pub struct FailedJob {
    pub input: PathBuf,
    pub message: String,
}

/// Outcome of a batch, in processing order
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchReport {
    pub converted: Vec<(PathBuf, PathBuf)>,
    pub failures: Vec<FailedJob>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// 1 when any file failed, 0 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() {
            1
        } else {
            0
        }
    }
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(INPUT_EXTENSION))
        .unwrap_or(false)
}

/// Find the drawings under `root`.
///
/// A matching file yields itself. A directory yields the matching files
/// directly inside it, or in its whole subtree when `recursive` is set,
/// sorted by path. Anything else yields nothing.
///
/// Symlinks to drawings count as drawings. Subdirectories that cannot be
/// read are skipped with a warning; only an unreadable `root` is an error.
pub fn discover_inputs(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(if has_input_extension(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    if !root.is_dir() {
        warn!("Input path does not exist: {}", root.display());
        return Ok(Vec::new());
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_path_context("read directory", root);
            }
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        // `Path::is_file` follows symlinks, `DirEntry::file_type` does not
        if entry.path().is_file() && has_input_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    info!("Discovered {} drawings under {}", files.len(), root.display());
    debug!("Drawings found: {:?}", files);
    Ok(files)
}

/// Output directory for `file`: `output_root` plus the file's folder relative
/// to `input_root`. Falls back to `output_root` when `input_root` is a file or
/// does not contain `file`.
pub fn target_dir_for(input_root: &Path, file: &Path, output_root: &Path) -> PathBuf {
    if !input_root.is_dir() {
        return output_root.to_path_buf();
    }

    file.parent()
        .and_then(|parent| parent.strip_prefix(input_root).ok())
        .map(|relative| output_root.join(relative))
        .unwrap_or_else(|| output_root.to_path_buf())
}

fn report_line(pb: &Option<ProgressBar>, out: &mut dyn Write, line: &str) {
    if let Err(e) = ProgressTracker::write_line(pb, out, line) {
        warn!("Failed to write report line: {}", e);
    }
}

/// Convert `files` one at a time, recording every success and failure.
///
/// One `OK:` or `FAIL:` line per file goes to `out` as it completes.
pub fn run_batch(
    converter: &dyn FileConverter,
    input_root: &Path,
    output_root: &Path,
    files: &[PathBuf],
    progress: &ProgressTracker,
    out: &mut dyn Write,
) -> BatchReport {
    let mut report = BatchReport::default();
    let pb = progress.create_conversion_progress(files.len());

    info!(
        "Converting {} drawings with the {} workflow",
        files.len(),
        converter.workflow().as_str()
    );

    for file in files {
        let target_dir = target_dir_for(input_root, file, output_root);
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ProgressTracker::update_progress(&pb, 0, Some(&name));

        match converter.convert(file, &target_dir) {
            Ok(output) => {
                report_line(
                    &pb,
                    out,
                    &format!("OK: {} -> {}", file.display(), output.display()),
                );
                report.converted.push((file.clone(), output));
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!("Conversion of {} failed: {}", file.display(), message);
                report_line(&pb, out, &format!("FAIL: {}: {}", file.display(), message));
                report.failures.push(FailedJob {
                    input: file.clone(),
                    message,
                });
            }
        }

        ProgressTracker::update_progress(&pb, 1, None);
    }

    if report.has_failures() {
        ProgressTracker::finish_with_error(
            pb,
            &format!("{} of {} drawings failed", report.failures.len(), report.total()),
        );
    } else {
        ProgressTracker::finish_progress(pb, "All drawings converted");
    }

    report
}
