//! Error handling for dwg2glb
//!
//! Propagation uses anyhow so every failure carries the file or command it
//! happened on. The named failure kinds of the conversion pipeline live in
//! [`ConversionError`].

use anyhow::Context;
use std::path::{Path, PathBuf};

pub type Result<T> = anyhow::Result<T>;

/// Extension trait for Results to add context with file paths
pub trait ResultExt<T> {
    /// Add context with file path information
    fn with_path_context<P: AsRef<Path>>(self, operation: &str, path: P) -> Result<T>;

    /// Add context naming the conversion step that failed
    fn with_conversion_context(self, from: &str, to: &str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error> + Send + Sync + 'static,
{
    fn with_path_context<P: AsRef<Path>>(self, operation: &str, path: P) -> Result<T> {
        self.map_err(|e| e.into())
            .with_context(|| format!("Failed to {} file: {}", operation, path.as_ref().display()))
    }

    fn with_conversion_context(self, from: &str, to: &str) -> Result<T> {
        self.map_err(|e| e.into())
            .with_context(|| format!("Error converting from {} to {}", from, to))
    }
}

/// Specific error types for dwg2glb operations
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("{tool} not found. {hint}")]
    ToolNotFound { tool: String, hint: String },

    #[error("Command failed (exit code {}): {command}\n{output}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    CommandFailed {
        command: String,
        /// `None` when the process was terminated by a signal
        code: Option<i32>,
        /// Captured stdout followed by stderr
        output: String,
    },

    #[error("Failed to start command: {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("DXF not produced by ODA File Converter")]
    DxfNotProduced,

    #[error("Intermediate file not created: {}", path.display())]
    IntermediateNotProduced { path: PathBuf },

    #[error("Output file not created: {}", path.display())]
    OutputNotProduced { path: PathBuf },

    #[error("Invalid configuration file {}: {reason}", path.display())]
    InvalidConfig { path: PathBuf, reason: String },
}
