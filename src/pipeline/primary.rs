//! Primary workflow: AutoCAD exports FBX, Blender converts FBX to GLB.

use super::scripts::{
    autocad_export_script, blender_glb_script, ScriptFile, AUTOCAD_SCRIPT_NAME, BLENDER_SCRIPT_NAME,
};
use super::{create_workspace, input_stem, output_file_for, FileConverter, Workflow};
use crate::error::{ConversionError, Result, ResultExt};
use crate::runner::{CommandRunner, ToolCommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Programmatic control of the CAD application, used in place of script mode
pub trait CadAutomation {
    /// Open `drawing`, export it as FBX to `fbx`, and close it without saving
    fn export_fbx(&self, drawing: &Path, fbx: &Path) -> Result<()>;
}

pub struct PrimaryConverter<R> {
    autocad: PathBuf,
    blender: PathBuf,
    automation: Option<Box<dyn CadAutomation>>,
    runner: R,
}

impl<R: CommandRunner> PrimaryConverter<R> {
    pub fn new(autocad: PathBuf, blender: PathBuf, runner: R) -> Self {
        Self {
            autocad,
            blender,
            automation: None,
            runner,
        }
    }

    pub fn with_automation(mut self, automation: Box<dyn CadAutomation>) -> Self {
        self.automation = Some(automation);
        self
    }

    fn export_fbx(&self, drawing: &Path, fbx: &Path, workspace: &Path) -> Result<()> {
        if let Some(automation) = &self.automation {
            return automation
                .export_fbx(drawing, fbx)
                .with_conversion_context("DWG", "FBX");
        }

        warn!("CAD automation interface not available, using AutoCAD script mode");
        let script = ScriptFile::write(
            workspace.join(AUTOCAD_SCRIPT_NAME),
            &autocad_export_script(&absolute(drawing)?, &absolute(fbx)?),
        )?;

        let command = ToolCommand::new(&self.autocad).arg("/s").arg(script.path());
        self.runner
            .run(&command)
            .with_conversion_context("DWG", "FBX")
    }

    fn export_glb(&self, fbx: &Path, glb: &Path, workspace: &Path) -> Result<()> {
        let script = ScriptFile::write(
            workspace.join(BLENDER_SCRIPT_NAME),
            &blender_glb_script(&absolute(fbx)?, &absolute(glb)?),
        )?;

        let command = ToolCommand::new(&self.blender)
            .arg("--background")
            .arg("--python")
            .arg(script.path());
        self.runner
            .run(&command)
            .with_conversion_context("FBX", "GLB")
    }
}

impl<R: CommandRunner> FileConverter for PrimaryConverter<R> {
    fn workflow(&self) -> Workflow {
        Workflow::Primary
    }

    fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let stem = input_stem(input)?;
        fs::create_dir_all(output_dir).with_path_context("create output directory", output_dir)?;

        let workspace = create_workspace()?;
        let fbx = output_file_for(workspace.path(), stem, "fbx");

        info!("Converting {} to FBX...", input.display());
        self.export_fbx(input, &fbx, workspace.path())?;
        if !fbx.exists() {
            return Err(ConversionError::IntermediateNotProduced { path: fbx }.into());
        }

        let glb = output_file_for(output_dir, stem, "glb");
        info!("Converting {} to GLB...", fbx.display());
        self.export_glb(&fbx, &glb, workspace.path())?;
        if !glb.exists() {
            return Err(ConversionError::OutputNotProduced { path: glb }.into());
        }

        Ok(glb)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_path_context("resolve absolute path of", path)
}
