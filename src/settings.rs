//! Configuration file loading
//!
//! The optional TOML file has two tables: `[tools]` maps a tool key to an
//! executable path and `[defaults]` holds default format options.

use crate::error::{ConversionError, Result, ResultExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Default configuration file name, looked up relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dwg2glb.toml";

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub tools: HashMap<String, String>,
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Defaults {
    pub dxf_version: Option<String>,
    pub glb: Option<bool>,
}

impl Settings {
    /// Load settings from `path`. A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No configuration file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).with_path_context("read configuration", path)?;
        let settings = Self::parse(&content).map_err(|e| ConversionError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Configured path for a tool key, ignoring empty entries
    pub fn tool_path(&self, key: &str) -> Option<&str> {
        self.tools
            .get(key)
            .map(String::as_str)
            .filter(|path| !path.trim().is_empty())
    }
}
