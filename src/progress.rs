//! Progress tracking and display using indicatif
//!
//! Batch progress bar plus a line writer that keeps per-file result lines
//! from tearing the bar.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use tracing::info;

/// Progress tracker for dwg2glb batches
pub struct ProgressTracker {
    enabled: bool,
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Create a progress bar for file operations
    pub fn create_file_progress(&self, total: usize, operation: &str) -> Option<ProgressBar> {
        if !self.enabled || total == 0 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏ ")
        );
        pb.set_message(format!("{}...", operation));
        pb.enable_steady_tick(Duration::from_millis(100));

        info!("Started progress tracking for: {}", operation);
        Some(pb)
    }

    /// Create a progress bar for conversion operations
    pub fn create_conversion_progress(&self, total: usize) -> Option<ProgressBar> {
        self.create_file_progress(total, "Converting drawings")
    }

    /// Update progress and optionally change message
    pub fn update_progress(pb: &Option<ProgressBar>, increment: u64, message: Option<&str>) {
        if let Some(ref progress) = pb {
            progress.inc(increment);
            if let Some(msg) = message {
                progress.set_message(msg.to_string());
            }
        }
    }

    /// Write a line to `out` with the bar cleared for the duration. The line
    /// is written even when the bar is hidden (stderr not a terminal).
    pub fn write_line<W: Write + ?Sized>(
        pb: &Option<ProgressBar>,
        out: &mut W,
        line: &str,
    ) -> io::Result<()> {
        match pb {
            Some(progress) => progress.suspend(|| writeln!(out, "{}", line)),
            None => writeln!(out, "{}", line),
        }
    }

    /// Finish progress with success message
    pub fn finish_progress(pb: Option<ProgressBar>, success_message: &str) {
        if let Some(progress) = pb {
            progress.finish_with_message(success_message.to_string());
            info!("Progress completed: {}", success_message);
        }
    }

    /// Finish progress with error message
    pub fn finish_with_error(pb: Option<ProgressBar>, error_message: &str) {
        if let Some(progress) = pb {
            progress.abandon_with_message(format!("FAIL: {}", error_message));
            info!("Progress abandoned: {}", error_message);
        }
    }
}
