//! Fake external tools shared by the integration tests
//!
//! `FakeTools` stands in for ODA File Converter, Assimp, AutoCAD and Blender
//! by writing the files each program would produce.

#![allow(dead_code)]

use dwg2glb::runner::{CommandRunner, ToolCommand};
use dwg2glb::ConversionError;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Default)]
pub struct FakeState {
    pub commands: Vec<ToolCommand>,
    /// Directories that held staged inputs or generated scripts
    pub workspaces: Vec<PathBuf>,
    /// Script contents as seen while the tool ran
    pub scripts: Vec<String>,
    /// Drawing stems whose first conversion step exits non-zero
    pub failing: HashSet<String>,
    /// Tools that exit successfully without writing anything
    pub silent: HashSet<&'static str>,
    /// ODA writes its DXF into a subfolder of the output directory
    pub nested_dxf: bool,
}

#[derive(Clone, Default)]
pub struct FakeTools {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(self, stem: &str) -> Self {
        self.state.borrow_mut().failing.insert(stem.to_string());
        self
    }

    pub fn silent(self, tool: &'static str) -> Self {
        self.state.borrow_mut().silent.insert(tool);
        self
    }

    pub fn nested_dxf(self) -> Self {
        self.state.borrow_mut().nested_dxf = true;
        self
    }

    pub fn commands(&self) -> Vec<ToolCommand> {
        self.state.borrow().commands.clone()
    }

    pub fn workspaces(&self) -> Vec<PathBuf> {
        self.state.borrow().workspaces.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state.borrow().scripts.clone()
    }

    fn tool_name(command: &ToolCommand) -> String {
        command
            .program
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    fn fail(&self, command: &ToolCommand, stem: &str) -> Result<(), ConversionError> {
        if self.state.borrow().failing.contains(stem) {
            return Err(ConversionError::CommandFailed {
                command: command.to_string(),
                code: Some(1),
                output: format!("simulated failure for {}", stem),
            });
        }
        Ok(())
    }

    fn is_silent(&self, tool: &str) -> bool {
        self.state.borrow().silent.contains(tool)
    }

    fn run_oda(&self, command: &ToolCommand) -> Result<(), ConversionError> {
        let src = arg_path(command, 0).expect("oda input dir").to_path_buf();
        let dst = arg_path(command, 1).expect("oda output dir").to_path_buf();
        if let Some(workspace) = src.parent() {
            self.state.borrow_mut().workspaces.push(workspace.to_path_buf());
        }

        for entry in fs::read_dir(&src).expect("read staging dir") {
            let path = entry.expect("entry").path();
            let stem = stem_of(&path);
            self.fail(command, &stem)?;
            if self.is_silent("oda") {
                continue;
            }
            let target_dir = if self.state.borrow().nested_dxf {
                dst.join("in")
            } else {
                dst.clone()
            };
            fs::create_dir_all(&target_dir).expect("create dxf dir");
            fs::write(target_dir.join(format!("{}.dxf", stem)), "0\nEOF\n").expect("write dxf");
        }
        Ok(())
    }

    fn run_assimp(&self, command: &ToolCommand) -> Result<(), ConversionError> {
        let dxf = arg_path(command, 1).expect("assimp input");
        let out = arg_path(command, 2).expect("assimp output");
        assert!(dxf.exists(), "assimp input must exist while it runs");
        if !self.is_silent("assimp") {
            fs::write(out, "glTF").expect("write scene");
        }
        Ok(())
    }

    fn run_script_tool(
        &self,
        command: &ToolCommand,
        tool: &'static str,
        script_index: usize,
    ) -> Result<(), ConversionError> {
        let script = arg_path(command, script_index).expect("script path");
        let content = fs::read_to_string(script).expect("script exists while tool runs");
        {
            let mut state = self.state.borrow_mut();
            if let Some(dir) = script.parent() {
                state.workspaces.push(dir.to_path_buf());
            }
            state.scripts.push(content.clone());
        }

        let (source, target) = if tool == "acad" {
            (
                line_path(&content, "._open"),
                line_path(&content, "._export"),
            )
        } else {
            let mut paths = content
                .lines()
                .filter(|line| line.contains("filepath="))
                .map(|line| PathBuf::from(line.split('"').nth(1).unwrap_or_default()));
            (
                paths.next().expect("import path"),
                paths.next().expect("export path"),
            )
        };

        self.fail(command, &stem_of(&source))?;
        if !self.is_silent(tool) {
            fs::write(target, tool).expect("write tool output");
        }
        Ok(())
    }
}

impl CommandRunner for FakeTools {
    fn run(&self, command: &ToolCommand) -> Result<(), ConversionError> {
        self.state.borrow_mut().commands.push(command.clone());

        match Self::tool_name(command).as_str() {
            "odafileconverter" => self.run_oda(command),
            "assimp" => self.run_assimp(command),
            "acad" => self.run_script_tool(command, "acad", 1),
            "blender" => self.run_script_tool(command, "blender", 2),
            other => panic!("unexpected tool {}", other),
        }
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn line_path(script: &str, marker: &str) -> PathBuf {
    let line = script
        .lines()
        .find(|line| line.contains(marker))
        .expect("script command");
    PathBuf::from(line.split('"').nth(3).expect("quoted path"))
}

/// Argument at `index` of `command` as a path
pub fn arg_path(command: &ToolCommand, index: usize) -> Option<&Path> {
    command.args.get(index).map(Path::new)
}

pub fn write_drawing(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create drawing dir");
    }
    fs::write(path, b"AC1032 fake drawing").expect("write drawing");
}
