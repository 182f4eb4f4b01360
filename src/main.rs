//! dwg2glb - Convert DWG drawings to GLB/GLTF
//!
//! Drives AutoCAD and Blender (or ODA File Converter and Assimp with
//! `--legacy`) over a single drawing or a folder of drawings.

use dwg2glb::{config::Config, converter::Converter};
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    // Parse configuration and initialize logging
    let config = Config::from_args().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    info!("Starting conversion process...");

    let converter = Converter::new(config);

    match converter.run() {
        Ok(status) => {
            if let Some(report) = status.report() {
                info!(
                    "Processed {} drawings, {} failed",
                    report.total(),
                    report.failures.len()
                );
            }
            // Exit codes are 0, 1 or 2
            ExitCode::from(status.code() as u8)
        }
        Err(e) => {
            error!("Conversion failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
