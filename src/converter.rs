//! Core conversion engine for dwg2glb
//!
//! This module orchestrates a run: it loads the configuration file, resolves
//! the external tools for the selected workflow, discovers the input
//! drawings, and hands them to the batch driver.

use crate::{
    batch::{discover_inputs, run_batch, BatchReport},
    config::Config,
    error::{ConversionError, Result, ResultExt},
    locator::{ToolKind, ToolLocator},
    pipeline::{FileConverter, LegacyConverter, PrimaryConverter, Workflow},
    progress::ProgressTracker,
    runner::{CommandRunner, ProcessRunner},
    settings::Settings,
};
use anyhow::Context;
use std::{fs, io, path::PathBuf};
use tracing::{info, warn};

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// Every drawing converted, or there was nothing to convert
    Success(BatchReport),
    /// At least one drawing failed
    PartialFailure(BatchReport),
    /// A required tool could not be located; no drawing was touched
    ToolMissing(String),
}

impl RunStatus {
    /// Process exit code
    pub fn code(&self) -> i32 {
        match self {
            RunStatus::Success(report) | RunStatus::PartialFailure(report) => report.exit_code(),
            RunStatus::ToolMissing(_) => 2,
        }
    }

    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            RunStatus::Success(report) | RunStatus::PartialFailure(report) => Some(report),
            RunStatus::ToolMissing(_) => None,
        }
    }
}

/// The main conversion engine
pub struct Converter {
    config: Config,
    locator: ToolLocator,
    runner: Box<dyn CommandRunner>,
    progress_tracker: ProgressTracker,
}

impl Converter {
    /// Create a converter that finds tools on this system and runs them as processes
    pub fn new(config: Config) -> Self {
        Self::with_parts(config, ToolLocator::system(), Box::new(ProcessRunner))
    }

    pub fn with_parts(
        config: Config,
        locator: ToolLocator,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        let progress_enabled = !config.no_progress;

        Self {
            config,
            locator,
            runner,
            progress_tracker: ProgressTracker::new(progress_enabled),
        }
    }

    /// Run the complete conversion process
    pub fn run(&self) -> Result<RunStatus> {
        let start = std::time::Instant::now();

        let settings = Settings::load(&self.config.config_path)
            .context("Failed to load configuration file")?;

        let converter = match self.build_pipeline(&settings) {
            Ok(converter) => converter,
            Err(ConversionError::ToolNotFound { tool, hint }) => {
                let message = format!("{} not found. {}", tool, hint);
                println!("ERROR: {}", message);
                return Ok(RunStatus::ToolMissing(message));
            }
            Err(e) => return Err(e.into()),
        };

        let output_root = &self.config.output;
        fs::create_dir_all(output_root)
            .with_path_context("create output directory", output_root)?;

        let files = discover_inputs(&self.config.input, self.config.recursive)
            .context("Failed to discover input files")?;
        if files.is_empty() {
            println!("No DWG files found.");
            return Ok(RunStatus::Success(BatchReport::default()));
        }

        let report = run_batch(
            converter.as_ref(),
            &self.config.input,
            output_root,
            &files,
            &self.progress_tracker,
            &mut io::stdout(),
        );

        info!(
            "Batch finished in {} ms: {} converted, {} failed",
            start.elapsed().as_millis(),
            report.converted.len(),
            report.failures.len()
        );

        match report.exit_code() {
            0 => Ok(RunStatus::Success(report)),
            _ => {
                println!("Completed with {} failures.", report.failures.len());
                Ok(RunStatus::PartialFailure(report))
            }
        }
    }

    /// Resolve the workflow's tools and build its single-file converter
    fn build_pipeline(
        &self,
        settings: &Settings,
    ) -> std::result::Result<Box<dyn FileConverter + '_>, ConversionError> {
        let [first, second] = self.config.required_tools();
        let first = self.resolve_tool(first, settings)?;
        let second = self.resolve_tool(second, settings)?;
        let runner = self.runner.as_ref();

        let converter: Box<dyn FileConverter + '_> = match self.config.workflow {
            Workflow::Primary => {
                warn_ignored_legacy_options(&self.config);
                Box::new(PrimaryConverter::new(first, second, runner))
            }
            Workflow::Legacy => {
                let dxf_version = self.config.effective_dxf_version(settings);
                let glb = self.config.effective_glb(settings);
                let converter = LegacyConverter::new(first, second, &dxf_version, glb, runner);
                info!(
                    "DXF version {}, emitting {}",
                    converter.dxf_version(),
                    if glb { "GLB" } else { "GLTF" }
                );
                Box::new(converter)
            }
        };

        Ok(converter)
    }

    fn resolve_tool(
        &self,
        kind: ToolKind,
        settings: &Settings,
    ) -> std::result::Result<PathBuf, ConversionError> {
        self.locator
            .resolve_required(kind, self.config.tools.get(kind), settings)
    }
}

fn warn_ignored_legacy_options(config: &Config) {
    if config.dxf_version.is_some() || config.glb.is_some() {
        warn!("--dxf-version and --glb only apply to the legacy workflow");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FailedJob;

    #[test]
    fn test_status_codes() {
        let failed = BatchReport {
            converted: Vec::new(),
            failures: vec![FailedJob {
                input: PathBuf::from("a.dwg"),
                message: "boom".to_string(),
            }],
        };

        assert_eq!(RunStatus::Success(BatchReport::default()).code(), 0);
        assert_eq!(RunStatus::PartialFailure(failed.clone()).code(), 1);
        assert_eq!(RunStatus::ToolMissing("x".to_string()).code(), 2);
        assert_eq!(
            RunStatus::PartialFailure(failed.clone()).report(),
            Some(&failed)
        );
        assert_eq!(RunStatus::ToolMissing("x".to_string()).report(), None);
    }

    #[test]
    fn test_missing_tool_stops_before_output_is_created() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = Config::new(dir.path(), dir.path().join("out"));
        config.config_path = dir.path().join("absent.toml");
        config.no_progress = true;

        let converter =
            Converter::with_parts(config, ToolLocator::new(None, Vec::new()), Box::new(ProcessRunner));
        let status = converter.run().expect("run");

        assert_eq!(
            status,
            RunStatus::ToolMissing(
                "AutoCAD not found. Provide --autocad or configure in TOML.".to_string()
            )
        );
        assert!(!dir.path().join("out").exists());
    }
}
