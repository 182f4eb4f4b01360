//! External command execution
//!
//! Every external tool invocation goes through [`CommandRunner`], so the
//! pipeline can be driven by a fake in tests. [`ProcessRunner`] spawns a
//! child process, waits for it without a timeout, and turns a non-zero exit
//! into [`ConversionError::CommandFailed`] carrying the captured output.

use crate::error::ConversionError;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, error};

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

pub trait CommandRunner {
    /// Run `command` to completion, failing if it exits unsuccessfully
    fn run(&self, command: &ToolCommand) -> Result<(), ConversionError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, command: &ToolCommand) -> Result<(), ConversionError> {
        (**self).run(command)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for Box<T> {
    fn run(&self, command: &ToolCommand) -> Result<(), ConversionError> {
        (**self).run(command)
    }
}

/// Runs commands as child processes of this one
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &ToolCommand) -> Result<(), ConversionError> {
        let start = Instant::now();
        debug!("Running: {}", command);

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ConversionError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            error!(
                "Command failed after {} ms: {} ({})",
                start.elapsed().as_millis(),
                command,
                output.status
            );
            return Err(ConversionError::CommandFailed {
                command: command.to_string(),
                code: output.status.code(),
                output: captured,
            });
        }

        debug!(
            "Command finished in {} ms: {}",
            start.elapsed().as_millis(),
            command.program.display()
        );
        Ok(())
    }
}
