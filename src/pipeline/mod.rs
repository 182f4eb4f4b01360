//! Single-file conversion pipelines
//!
//! A run picks one [`Workflow`] and converts every drawing with the matching
//! [`FileConverter`] implementation:
//! - [`PrimaryConverter`]: AutoCAD exports FBX, Blender imports it and writes GLB
//! - [`LegacyConverter`]: ODA File Converter writes DXF, Assimp exports GLB/GLTF
//!
//! Each conversion stages its intermediate files in a private temporary
//! workspace that is removed when the conversion returns.

pub mod legacy;
pub mod primary;
pub mod scripts;

pub use legacy::{normalize_dxf_version, LegacyConverter};
pub use primary::{CadAutomation, PrimaryConverter};

use crate::error::{ConversionError, Result};
use anyhow::Context;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Conversion workflow selected once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    /// AutoCAD + Blender
    Primary,
    /// ODA File Converter + Assimp
    Legacy,
}

impl Workflow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Workflow::Primary => "primary",
            Workflow::Legacy => "legacy",
        }
    }
}

/// Converts one DWG file into a scene file inside `output_dir`
pub trait FileConverter {
    fn workflow(&self) -> Workflow;

    /// Convert `input` and return the path of the produced file
    fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf>;
}

impl<T: FileConverter + ?Sized> FileConverter for Box<T> {
    fn workflow(&self) -> Workflow {
        (**self).workflow()
    }

    fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        (**self).convert(input, output_dir)
    }
}

/// Fail with `InputNotFound` unless `input` exists, and return its file stem
fn input_stem(input: &Path) -> Result<&OsStr> {
    if !input.exists() {
        return Err(ConversionError::InputNotFound {
            path: input.to_path_buf(),
        }
        .into());
    }

    input
        .file_stem()
        .with_context(|| format!("Invalid input file name: {}", input.display()))
}

/// `<output_dir>/<stem>.<extension>`
pub fn output_file_for(output_dir: &Path, stem: &OsStr, extension: &str) -> PathBuf {
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    output_dir.join(name)
}

fn create_workspace() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("dwg2glb-")
        .tempdir()
        .context("Failed to create temporary workspace")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_for() {
        let out = output_file_for(Path::new("/out/site"), OsStr::new("plan.v2"), "glb");

        assert_eq!(out, PathBuf::from("/out/site/plan.v2.glb"));
    }

    #[test]
    fn test_missing_input_reports_path() {
        let err = input_stem(Path::new("/nonexistent/plan.dwg")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConversionError>(),
            Some(ConversionError::InputNotFound { path }) if path == Path::new("/nonexistent/plan.dwg")
        ));
    }

    #[test]
    fn test_workspaces_are_distinct() {
        let first = create_workspace().expect("workspace");
        let second = create_workspace().expect("workspace");

        assert_ne!(first.path(), second.path());
        assert!(first
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("dwg2glb-")));
    }
}
