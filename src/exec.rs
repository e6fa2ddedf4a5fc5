//! Subprocess execution.
//!
//! Every external command the collector issues goes through [`CommandRunner`].
//! [`SystemRunner`] spawns real processes; tests swap in a recorder.

use crate::catalog::Step;
use crate::{Result, ZkalcError};
use std::fmt;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// A fully resolved command: what to run, where, and where its stdout goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// `None` inherits the collector's stdout; `Some` truncates and captures into the file
    pub stdout: Option<PathBuf>,
}

impl Invocation {
    pub fn new(step: &Step, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: step.program.clone(),
            args: step.args.clone(),
            cwd: cwd.into(),
            stdout: None,
        }
    }

    /// Redirect stdout into `path`.
    pub fn capture_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    /// The command line without cwd or redirection, for messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(cd {} && {}", self.cwd.display(), self.command_line())?;
        if let Some(path) = &self.stdout {
            write!(f, " 1> {}", path.display())?;
        }
        write!(f, ")")
    }
}

/// Runs commands to completion, one at a time.
pub trait CommandRunner {
    /// Run `invocation` and block until it exits.
    ///
    /// Returns an error when the program cannot be started or exits unsuccessfully.
    fn run(&mut self, invocation: &Invocation) -> Result<()>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        (**self).run(invocation)
    }
}

/// Spawns real child processes with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        debug!(command = %invocation, "Spawning");

        let stdout = match &invocation.stdout {
            Some(path) => Stdio::from(create_capture(path)?),
            None => Stdio::inherit(),
        };

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| spawn_error(invocation, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ZkalcError::CommandFailed {
                command: invocation.command_line(),
                code: status.code(),
            })
        }
    }
}

fn create_capture(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| ZkalcError::io(path, e))
}

fn spawn_error(invocation: &Invocation, err: std::io::Error) -> ZkalcError {
    // A missing cwd also reports NotFound; only blame the program when the cwd exists.
    if err.kind() == ErrorKind::NotFound && invocation.cwd.is_dir() {
        ZkalcError::ProgramNotFound {
            program: invocation.program.clone(),
        }
    } else {
        ZkalcError::Spawn {
            command: invocation.to_string(),
            source: err,
        }
    }
}
