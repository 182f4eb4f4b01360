//! External tool discovery
//!
//! Finds the executables the conversion pipeline shells out to. Resolution
//! order, first hit wins:
//! 1. An explicit path given on the command line
//! 2. The path recorded under the tool's key in the configuration file
//! 3. The first common executable name found on the search path
//! 4. A well-known install location whose file name matches the tool

use crate::error::ConversionError;
use crate::settings::Settings;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Well-known Windows install locations checked after the search path
const WELL_KNOWN_LOCATIONS: &[&str] = &[
    r"C:\Program Files\ODA\ODAFileConverter\ODAFileConverter.exe",
    r"C:\Program Files (x86)\ODA\ODAFileConverter\ODAFileConverter.exe",
    r"C:\Program Files\Assimp\bin\assimp.exe",
    r"C:\Program Files (x86)\Assimp\bin\assimp.exe",
    r"C:\Program Files\Autodesk\AutoCAD 2024\acad.exe",
    r"C:\Program Files\Autodesk\AutoCAD 2023\acad.exe",
    r"C:\Program Files\Autodesk\AutoCAD 2022\acad.exe",
    r"C:\Program Files\Autodesk\AutoCAD 2021\acad.exe",
    r"C:\Program Files\Blender Foundation\Blender 4.0\blender.exe",
    r"C:\Program Files\Blender Foundation\Blender 3.6\blender.exe",
    r"C:\Program Files\Blender Foundation\Blender 3.5\blender.exe",
];

/// External tools used by the two workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Oda,
    Assimp,
    AutoCad,
    Blender,
}

impl ToolKind {
    /// Key under `[tools]` in the configuration file
    pub fn key(&self) -> &'static str {
        match self {
            ToolKind::Oda => "oda",
            ToolKind::Assimp => "assimp",
            ToolKind::AutoCad => "autocad",
            ToolKind::Blender => "blender",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Oda => "ODA File Converter",
            ToolKind::Assimp => "assimp",
            ToolKind::AutoCad => "AutoCAD",
            ToolKind::Blender => "Blender",
        }
    }

    /// Executable names tried on the search path
    pub fn common_names(&self) -> &'static [&'static str] {
        match self {
            ToolKind::Oda => &["ODAFileConverter.exe", "ODAFileConverter"],
            ToolKind::Assimp => &["assimp.exe", "assimp"],
            ToolKind::AutoCad => &["acad.exe", "AutoCAD"],
            ToolKind::Blender => &["blender.exe", "blender"],
        }
    }

    /// File name a well-known location must have to count for this tool
    pub fn executable_file_name(&self) -> &'static str {
        match self {
            ToolKind::Oda => "odafileconverter.exe",
            ToolKind::Assimp => "assimp.exe",
            ToolKind::AutoCad => "acad.exe",
            ToolKind::Blender => "blender.exe",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "oda" => Some(ToolKind::Oda),
            "assimp" => Some(ToolKind::Assimp),
            "autocad" => Some(ToolKind::AutoCad),
            "blender" => Some(ToolKind::Blender),
            _ => None,
        }
    }

    /// Hint printed when the tool cannot be located
    pub fn missing_hint(&self) -> &'static str {
        match self {
            ToolKind::Oda => "Provide --oda or configure in TOML.",
            ToolKind::Assimp => "Provide --assimp or put on PATH.",
            ToolKind::AutoCad => "Provide --autocad or configure in TOML.",
            ToolKind::Blender => "Provide --blender or put on PATH.",
        }
    }
}

/// Looks up external tool executables
#[derive(Debug, Clone)]
pub struct ToolLocator {
    /// Search path in `PATH` syntax; `None` disables search-path lookup
    search_path: Option<OsString>,
    well_known: Vec<PathBuf>,
}

impl ToolLocator {
    pub fn new(search_path: Option<OsString>, well_known: Vec<PathBuf>) -> Self {
        Self {
            search_path,
            well_known,
        }
    }

    /// Locator backed by the process `PATH` and the built-in install locations
    pub fn system() -> Self {
        Self::new(
            std::env::var_os("PATH"),
            WELL_KNOWN_LOCATIONS.iter().map(PathBuf::from).collect(),
        )
    }

    /// Resolve a tool path. Returns `None` when no candidate exists.
    pub fn resolve(
        &self,
        explicit: Option<&Path>,
        settings: &Settings,
        tool_key: &str,
        candidate_names: &[&str],
    ) -> Option<PathBuf> {
        if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
            debug!("Using explicit {} path: {}", tool_key, path.display());
            return Some(path.to_path_buf());
        }

        if let Some(path) = settings.tool_path(tool_key) {
            debug!("Using configured {} path: {}", tool_key, path);
            return Some(PathBuf::from(path));
        }

        if let Some(path) = self.find_on_search_path(candidate_names) {
            debug!("Found {} on search path: {}", tool_key, path.display());
            return Some(path);
        }

        let expected = ToolKind::from_key(tool_key).map(|kind| kind.executable_file_name());
        self.well_known
            .iter()
            .filter(|path| path.is_file())
            .find(|path| match expected {
                Some(expected) => file_name_matches(path, expected),
                None => false,
            })
            .cloned()
    }

    /// Resolve a tool the selected workflow cannot run without
    pub fn resolve_required(
        &self,
        kind: ToolKind,
        explicit: Option<&Path>,
        settings: &Settings,
    ) -> std::result::Result<PathBuf, ConversionError> {
        let path = self
            .resolve(explicit, settings, kind.key(), kind.common_names())
            .ok_or_else(|| ConversionError::ToolNotFound {
                tool: kind.display_name().to_string(),
                hint: kind.missing_hint().to_string(),
            })?;

        info!("{}: {}", kind.display_name(), path.display());
        Ok(path)
    }

    fn find_on_search_path(&self, candidate_names: &[&str]) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        let cwd = std::env::current_dir().ok()?;

        candidate_names
            .iter()
            .find_map(|name| which::which_in(name, Some(search_path), &cwd).ok())
    }
}

fn file_name_matches(path: &Path, expected: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}
