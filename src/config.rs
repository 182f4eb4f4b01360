//! Configuration management for dwg2glb
//!
//! This module handles CLI argument parsing, logging setup, and merging
//! command-line options with the configuration file defaults.

use crate::locator::ToolKind;
use crate::pipeline::legacy::DEFAULT_DXF_VERSION;
use crate::pipeline::Workflow;
use crate::settings::{Settings, DEFAULT_CONFIG_FILE};
use anyhow::{anyhow, Result};
use clap::builder::styling;
use clap::{value_parser, Arg, ArgMatches, ColorChoice, Command};
use std::path::{Path, PathBuf};
use tracing::info;

/// Build the CLI command
pub fn build_cli() -> Command {
    let styles = styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Blue.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default());

    Command::new("dwg2glb")
        .about("dwg2glb - Convert DWG drawings to GLB using AutoCAD and Blender")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Input DWG file or folder")
                .value_parser(value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output folder for GLB files")
                .value_parser(value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recurse into subfolders when input is a folder")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to config TOML")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_CONFIG_FILE),
        )
        .arg(
            Arg::new("legacy")
                .long("legacy")
                .help("Use legacy ODA + Assimp workflow")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("autocad")
                .long("autocad")
                .help("Path to AutoCAD executable")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("blender")
                .long("blender")
                .help("Path to Blender executable")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("oda")
                .long("oda")
                .help("Path to ODAFileConverter executable (legacy mode)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("assimp")
                .long("assimp")
                .help("Path to assimp executable (legacy mode)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("dxf_version")
                .long("dxf-version")
                .help("DXF target version, e.g. ACAD2018 (legacy mode only)")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("glb")
                .long("glb")
                .help("Emit GLB (true) or GLTF (false) (legacy mode only)")
                .value_parser(["true", "false"]),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_progress")
                .long("no-progress")
                .help("Disable progress indicators")
                .action(clap::ArgAction::SetTrue),
        )
}

#[derive(Debug, Clone, Default)]
pub struct ToolOverrides {
    pub autocad: Option<PathBuf>,
    pub blender: Option<PathBuf>,
    pub oda: Option<PathBuf>,
    pub assimp: Option<PathBuf>,
}

impl ToolOverrides {
    pub fn get(&self, kind: ToolKind) -> Option<&Path> {
        match kind {
            ToolKind::AutoCad => self.autocad.as_deref(),
            ToolKind::Blender => self.blender.as_deref(),
            ToolKind::Oda => self.oda.as_deref(),
            ToolKind::Assimp => self.assimp.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Input DWG file or directory
    pub input: PathBuf,

    /// Output root directory
    pub output: PathBuf,

    /// Recurse into subdirectories of `input`
    pub recursive: bool,

    /// Configuration file path
    pub config_path: PathBuf,

    pub workflow: Workflow,

    /// Tool paths given on the command line
    pub tools: ToolOverrides,

    /// `--dxf-version`, legacy workflow only
    pub dxf_version: Option<String>,

    /// `--glb`, legacy workflow only
    pub glb: Option<bool>,

    /// Enable verbose logging
    pub verbose: bool,

    /// Disable progress bars
    pub no_progress: bool,
}

impl Config {
    /// Configuration with defaults for everything but the input and output paths
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            recursive: false,
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            workflow: Workflow::Primary,
            tools: ToolOverrides::default(),
            dxf_version: None,
            glb: None,
            verbose: false,
            no_progress: false,
        }
    }

    /// Parse arguments and apply initial configuration
    pub fn from_args() -> Result<Self> {
        // --help and --version exit here; usage errors are returned so that
        // exit code 2 stays reserved for missing tools
        let matches = match build_cli().try_get_matches() {
            Ok(matches) => matches,
            Err(e) if !e.use_stderr() => e.exit(),
            Err(e) => return Err(e.into()),
        };
        let config = Self::from_matches(&matches)?;

        // Set up tracing with environment variable support
        // RUST_LOG takes precedence over verbose flag
        let default_filter = if config.verbose { "info" } else { "off" };
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();

        if config.verbose {
            info!("Configuration: {:?}", config);
        }

        Ok(config)
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let input = matches
            .get_one::<PathBuf>("input")
            .cloned()
            .ok_or_else(|| anyhow!("Input path is required"))?;

        let output = matches
            .get_one::<PathBuf>("output")
            .cloned()
            .ok_or_else(|| anyhow!("Output path is required"))?;

        let config_path = matches
            .get_one::<PathBuf>("config")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let workflow = if matches.get_flag("legacy") {
            Workflow::Legacy
        } else {
            Workflow::Primary
        };

        let tools = ToolOverrides {
            autocad: matches.get_one::<PathBuf>("autocad").cloned(),
            blender: matches.get_one::<PathBuf>("blender").cloned(),
            oda: matches.get_one::<PathBuf>("oda").cloned(),
            assimp: matches.get_one::<PathBuf>("assimp").cloned(),
        };

        let glb = matches
            .get_one::<String>("glb")
            .map(|value| value.eq_ignore_ascii_case("true"));

        Ok(Config {
            input,
            output,
            recursive: matches.get_flag("recursive"),
            config_path,
            workflow,
            tools,
            dxf_version: matches.get_one::<String>("dxf_version").cloned(),
            glb,
            verbose: matches.get_flag("verbose"),
            no_progress: matches.get_flag("no_progress"),
        })
    }

    /// Tools the selected workflow needs, in resolution order
    pub fn required_tools(&self) -> [ToolKind; 2] {
        match self.workflow {
            Workflow::Primary => [ToolKind::AutoCad, ToolKind::Blender],
            Workflow::Legacy => [ToolKind::Oda, ToolKind::Assimp],
        }
    }

    /// DXF target version: command line, then config file, then the default
    pub fn effective_dxf_version(&self, settings: &Settings) -> String {
        self.dxf_version
            .clone()
            .or_else(|| settings.defaults.dxf_version.clone())
            .unwrap_or_else(|| DEFAULT_DXF_VERSION.to_string())
    }

    /// GLB or GLTF output: command line, then config file, then GLB
    pub fn effective_glb(&self, settings: &Settings) -> bool {
        self.glb.or(settings.defaults.glb).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let matches = build_cli()
            .try_get_matches_from(std::iter::once("dwg2glb").chain(args.iter().copied()))
            .expect("arguments should parse");
        Config::from_matches(&matches).expect("config")
    }

    #[test]
    fn test_minimal_arguments() {
        let config = parse(&["--input", "drawings", "--output", "out"]);

        assert_eq!(config.input, PathBuf::from("drawings"));
        assert_eq!(config.output, PathBuf::from("out"));
        assert_eq!(config.config_path, PathBuf::from("dwg2glb.toml"));
        assert_eq!(config.workflow, Workflow::Primary);
        assert!(!config.recursive);
        assert_eq!(config.glb, None);
        assert_eq!(config.required_tools(), [ToolKind::AutoCad, ToolKind::Blender]);
    }

    #[test]
    fn test_legacy_arguments() {
        let config = parse(&[
            "-i",
            "plan.dwg",
            "-o",
            "out",
            "--legacy",
            "-r",
            "--oda",
            "/opt/oda/ODAFileConverter",
            "--dxf-version",
            "AC1027",
            "--glb",
            "false",
        ]);

        assert_eq!(config.workflow, Workflow::Legacy);
        assert!(config.recursive);
        assert_eq!(
            config.tools.get(ToolKind::Oda),
            Some(Path::new("/opt/oda/ODAFileConverter"))
        );
        assert_eq!(config.tools.get(ToolKind::Assimp), None);
        assert_eq!(config.dxf_version.as_deref(), Some("AC1027"));
        assert_eq!(config.glb, Some(false));
        assert_eq!(config.required_tools(), [ToolKind::Oda, ToolKind::Assimp]);
    }

    #[test]
    fn test_missing_required_arguments() {
        assert!(build_cli()
            .try_get_matches_from(["dwg2glb", "--input", "x"])
            .is_err());
    }

    #[test]
    fn test_invalid_glb_value_rejected() {
        assert!(build_cli()
            .try_get_matches_from(["dwg2glb", "-i", "x", "-o", "y", "--glb", "yes"])
            .is_err());
    }

    #[test]
    fn test_format_options_fall_back_to_settings() {
        let mut settings = Settings::default();
        settings.defaults.dxf_version = Some("ACAD2010".to_string());
        settings.defaults.glb = Some(false);

        let mut config = Config::new("in", "out");
        assert_eq!(config.effective_dxf_version(&settings), "ACAD2010");
        assert!(!config.effective_glb(&settings));

        config.dxf_version = Some("AC1015".to_string());
        config.glb = Some(true);
        assert_eq!(config.effective_dxf_version(&settings), "AC1015");
        assert!(config.effective_glb(&settings));

        let empty = Settings::default();
        let config = Config::new("in", "out");
        assert_eq!(config.effective_dxf_version(&empty), "ACAD2018");
        assert!(config.effective_glb(&empty));
    }
}
