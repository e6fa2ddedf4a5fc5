//! Test fixtures and scenario configuration.
//!
//! [`TestWorkspace`] is a throwaway repository root; [`RecordingRunner`] stands
//! in for real subprocesses when a test only cares about which commands ran.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zkalc_collect::{
    Catalog, CommandRunner, Invocation, OutputFormat, Result, Settings, Source, Step, Target,
    ZkalcError,
};

/// A temporary repository root with default settings.
pub struct TestWorkspace {
    pub dir: TempDir,
    pub settings: Settings,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let settings = Settings::new(dir.path());
        Self { dir, settings }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create a directory (and parents) under the root.
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(&path).expect("Failed to create directory");
        path
    }

    /// Write a file under the root, creating parents.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, contents).expect("Failed to write file");
        path
    }

    pub fn output(&self, file_name: &str) -> PathBuf {
        self.settings.outdir.join(file_name)
    }
}

/// `sh -c <script>`
pub fn shell_step(script: &str) -> Step {
    Step::new("sh", &["-c", script])
}

/// A target benchmarked from a local directory.
pub fn local_target(name: &str, workdir: &str, script: &str, format: OutputFormat) -> Target {
    Target {
        name: name.to_string(),
        description: format!("{} test target", name),
        workdir: PathBuf::from(workdir),
        source: None,
        setup: Vec::new(),
        bench: shell_step(script),
        format,
    }
}

/// A target benchmarked from a clone at `checkout`.
pub fn cloned_target(name: &str, repository: &str, checkout: &str, script: &str) -> Target {
    Target {
        name: name.to_string(),
        description: format!("{} cloned test target", name),
        workdir: PathBuf::from(checkout),
        source: Some(Source {
            repository: repository.to_string(),
            checkout: PathBuf::from(checkout),
            revision: None,
        }),
        setup: Vec::new(),
        bench: shell_step(script),
        format: OutputFormat::Text,
    }
}

/// A validated catalog with no tooling.
pub fn catalog_of(targets: Vec<Target>) -> Catalog {
    let catalog = Catalog {
        tooling: Vec::new(),
        targets,
    };
    catalog.validate().expect("Test catalog should be valid");
    catalog
}

/// Records invocations instead of spawning them.
///
/// `git clone` creates the destination directory and captured stdout is filled
/// with `payload`, so the collector sees the same filesystem effects as a real run.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub invocations: Vec<Invocation>,
    pub payload: String,
    /// Fail invocations matching this rule
    pub failure: Option<Failure>,
}

/// Which invocations a [`RecordingRunner`] fails, and with what exit code.
#[derive(Debug, Clone)]
pub struct Failure {
    pub program: String,
    /// Only fail when the argument at this index matches
    pub arg: Option<(usize, String)>,
    pub code: i32,
}

impl Failure {
    fn matches(&self, invocation: &Invocation) -> bool {
        self.program == invocation.program
            && self.arg.as_ref().map_or(true, |(index, arg)| {
                invocation.args.get(*index) == Some(arg)
            })
    }
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            payload: "recorded output\n".to_string(),
            ..Default::default()
        }
    }

    pub fn failing_on(program: &str, code: i32) -> Self {
        Self {
            failure: Some(Failure {
                program: program.to_string(),
                arg: None,
                code,
            }),
            ..Self::new()
        }
    }

    /// Fail only `program` calls whose argument at `index` is `arg`.
    pub fn failing_on_arg(program: &str, index: usize, arg: &str, code: i32) -> Self {
        Self {
            failure: Some(Failure {
                program: program.to_string(),
                arg: Some((index, arg.to_string())),
                code,
            }),
            ..Self::new()
        }
    }

    pub fn programs(&self) -> Vec<&str> {
        self.invocations.iter().map(|i| i.program.as_str()).collect()
    }

    pub fn git_invocations(&self) -> Vec<&Invocation> {
        self.invocations
            .iter()
            .filter(|i| i.program == "git")
            .collect()
    }

    /// Output files the bench steps were captured into, in order.
    pub fn captures(&self) -> Vec<PathBuf> {
        self.invocations
            .iter()
            .filter_map(|i| i.stdout.clone())
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        self.invocations.push(invocation.clone());

        if let Some(path) = &invocation.stdout {
            fs::write(path, &self.payload).map_err(|e| ZkalcError::io(path, e))?;
        }

        if let Some(failure) = &self.failure {
            if failure.matches(invocation) {
                return Err(ZkalcError::CommandFailed {
                    command: invocation.command_line(),
                    code: Some(failure.code),
                });
            }
        }

        let is_clone = invocation.args.first().map(String::as_str) == Some("clone");
        if invocation.program == "git" && is_clone {
            let dest = invocation.cwd.join(&invocation.args[2]);
            fs::create_dir_all(&dest).map_err(|e| ZkalcError::io(&dest, e))?;
        }

        Ok(())
    }
}
