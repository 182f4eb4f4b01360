//! Script generation for AutoCAD batch mode and Blender background mode.

use crate::error::{Result, ResultExt};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const AUTOCAD_SCRIPT_NAME: &str = "autocad_script.scr";
pub const BLENDER_SCRIPT_NAME: &str = "blender_script.py";

/// A generated script file, removed when dropped
#[derive(Debug)]
pub struct ScriptFile {
    path: PathBuf,
}

impl ScriptFile {
    pub fn write(path: PathBuf, content: &str) -> Result<Self> {
        fs::write(&path, content).with_path_context("write script", &path)?;
        debug!("Wrote script {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScriptFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove script {}: {}", self.path.display(), e),
        }
    }
}

/// AutoCAD script: open the drawing, export FBX, close without saving, quit
pub fn autocad_export_script(drawing: &Path, fbx: &Path) -> String {
    format!(
        r#"
(command "._open" {drawing})
(command "._export" {fbx} "FBX")
(command "._close" "N")
(command "._quit")
"#,
        drawing = quoted(drawing),
        fbx = quoted(fbx),
    )
}

/// Blender script: clear the default scene, import FBX, export GLB
pub fn blender_glb_script(fbx: &Path, glb: &Path) -> String {
    format!(
        r#"
import bpy

bpy.ops.object.select_all(action='SELECT')
bpy.ops.object.delete(use_global=False)

bpy.ops.import_scene.fbx(filepath={fbx})

bpy.ops.export_scene.gltf(
    filepath={glb},
    export_format='GLB',
    export_materials='EXPORT',
    export_normals=True,
    export_tangents=True,
    export_animations=True,
    export_skins=True
)
"#,
        fbx = quoted(fbx),
        glb = quoted(glb),
    )
}

/// Double-quoted string literal valid in both AutoLISP and Python
fn quoted(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
