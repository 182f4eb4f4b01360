// SPDX-FileCopyrightText: 2025 Shalek Chaye
// SPDX-License-Identifier: Apache-2.0

//! dwg2glb - batch conversion of DWG drawings to GLB/GLTF scenes
//!
//! No geometry is handled here: every conversion step is delegated to an
//! external program. The crate resolves those programs, stages each drawing
//! in a private temporary workspace, runs the tools, and collects per-file
//! results across a batch.

pub mod batch;
pub mod config;
pub mod converter;
pub mod error;
pub mod locator;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod settings;

pub use config::Config;
pub use converter::{Converter, RunStatus};
pub use error::ConversionError;
pub use pipeline::{FileConverter, Workflow};
