//! Legacy workflow: ODA File Converter (DWG to DXF) then Assimp (DXF to GLB/GLTF).

use super::{create_workspace, input_stem, output_file_for, FileConverter, Workflow};
use crate::error::{ConversionError, Result, ResultExt};
use crate::runner::{CommandRunner, ToolCommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// DXF version used when none is given or the given one is not recognized
pub const DEFAULT_DXF_VERSION: &str = "ACAD2018";

/// DXF file-format codes and the ODA version names they correspond to
const DXF_VERSION_CODES: &[(&str, &str)] = &[
    ("AC1015", "ACAD2000"),
    ("AC1018", "ACAD2004"),
    ("AC1021", "ACAD2007"),
    ("AC1024", "ACAD2010"),
    ("AC1027", "ACAD2013"),
    ("AC1032", "ACAD2018"),
];

/// Map a DXF version code to the name ODA File Converter expects.
///
/// `ACAD*` names pass through. Unrecognized values fall back to
/// [`DEFAULT_DXF_VERSION`] instead of failing.
pub fn normalize_dxf_version(version: &str) -> String {
    let version = version.trim().to_uppercase();
    if version.starts_with("ACAD") {
        return version;
    }

    DXF_VERSION_CODES
        .iter()
        .find(|(code, _)| *code == version)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| DEFAULT_DXF_VERSION.to_string())
}

pub struct LegacyConverter<R> {
    oda: PathBuf,
    assimp: PathBuf,
    dxf_version: String,
    emit_glb: bool,
    runner: R,
}

impl<R: CommandRunner> LegacyConverter<R> {
    pub fn new(oda: PathBuf, assimp: PathBuf, dxf_version: &str, emit_glb: bool, runner: R) -> Self {
        Self {
            oda,
            assimp,
            dxf_version: normalize_dxf_version(dxf_version),
            emit_glb,
            runner,
        }
    }

    pub fn dxf_version(&self) -> &str {
        &self.dxf_version
    }

    /// Convert every DWG directly inside `src_dir` into `dst_dir`
    fn run_oda(&self, src_dir: &Path, dst_dir: &Path) -> Result<()> {
        // ODAFileConverter "inDir" "outDir" version type recurse audit filter
        let command = ToolCommand::new(&self.oda)
            .arg(src_dir)
            .arg(dst_dir)
            .arg(&self.dxf_version)
            .args(["DXF", "0", "0", "*.DWG"]);

        self.runner
            .run(&command)
            .with_conversion_context("DWG", "DXF")
    }

    fn run_assimp(&self, dxf: &Path, out_file: &Path) -> Result<()> {
        let format = if self.emit_glb { "glb2" } else { "gltf2" };
        let command = ToolCommand::new(&self.assimp)
            .arg("export")
            .arg(dxf)
            .arg(out_file)
            .args(["-f", format]);

        self.runner
            .run(&command)
            .with_conversion_context("DXF", format)
    }
}

impl<R: CommandRunner> FileConverter for LegacyConverter<R> {
    fn workflow(&self) -> Workflow {
        Workflow::Legacy
    }

    fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let stem = input_stem(input)?;
        fs::create_dir_all(output_dir).with_path_context("create output directory", output_dir)?;

        let workspace = create_workspace()?;
        let staging_in = workspace.path().join("in");
        let staging_out = workspace.path().join("out");
        fs::create_dir_all(&staging_in).with_path_context("create staging directory", &staging_in)?;
        fs::create_dir_all(&staging_out)
            .with_path_context("create staging directory", &staging_out)?;

        let file_name = input.file_name().unwrap_or(stem);
        let staged = staging_in.join(file_name);
        stage_copy(input, &staged)?;

        info!("Converting {} to DXF ({})", input.display(), self.dxf_version);
        self.run_oda(&staging_in, &staging_out)?;

        let dxf = find_dxf(&staging_out, &format!("{}.dxf", stem.to_string_lossy()))
            .ok_or(ConversionError::DxfNotProduced)?;
        debug!("DXF produced at {}", dxf.display());

        let extension = if self.emit_glb { "glb" } else { "gltf" };
        let out_file = output_file_for(output_dir, stem, extension);
        info!("Exporting {} to {}", dxf.display(), out_file.display());
        self.run_assimp(&dxf, &out_file)?;

        if !out_file.exists() {
            return Err(ConversionError::OutputNotProduced { path: out_file }.into());
        }

        Ok(out_file)
    }
}

/// Copy `input` to `staged`, keeping its modification time
fn stage_copy(input: &Path, staged: &Path) -> Result<()> {
    fs::copy(input, staged).with_path_context("stage input", input)?;

    let modified = fs::metadata(input).and_then(|meta| meta.modified());
    let restored = modified.and_then(|time| {
        fs::OpenOptions::new()
            .write(true)
            .open(staged)
            .and_then(|file| file.set_modified(time))
    });
    if let Err(e) = restored {
        debug!("Could not preserve modification time of {}: {}", staged.display(), e);
    }

    Ok(())
}

/// Locate the DXF ODA produced, either at the top of `out_dir` or in a subfolder
fn find_dxf(out_dir: &Path, expected_name: &str) -> Option<PathBuf> {
    let direct = out_dir.join(expected_name);
    if direct.is_file() {
        return Some(direct);
    }

    WalkDir::new(out_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| name.eq_ignore_ascii_case(expected_name))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
}
