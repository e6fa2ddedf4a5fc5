//! Declarative table of benchmark targets.
//!
//! A [`Catalog`] lists the tooling `init` installs and every curve library the
//! collector knows how to benchmark. Each [`Target`] says where the library
//! lives (a local backend crate or a git repository to clone), which setup
//! commands install its dependencies, and which command prints its benchmark
//! results to stdout.
//!
//! ## Path Invariants
//!
//! All `workdir` and `checkout` paths are relative to the repository root and
//! never contain `..`. `clean` deletes checkout directories, so a catalog must
//! not be able to point it outside the root.

use crate::config::{self, BACKEND_DIR, CARGO_CRITERION_ARGS, RESERVED_TARGET_NAMES};
use crate::{Result, ZkalcError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

/// A single command line: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Step {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Format of the captured stdout, which fixes the result file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-delimited JSON (criterion-style runners, `go test -json`)
    Json,
    /// Free-form text (shell-script runners)
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

/// A git repository the target is benchmarked from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Clone URL
    pub repository: String,
    /// Destination directory, relative to the root
    pub checkout: PathBuf,
    /// Optional revision checked out right after cloning
    #[serde(default)]
    pub revision: Option<String>,
}

/// One curve library benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Directory the setup and bench steps run in, relative to the root
    pub workdir: PathBuf,
    #[serde(default)]
    pub source: Option<Source>,
    /// Dependency installation, run before the bench step
    #[serde(default)]
    pub setup: Vec<Step>,
    /// Benchmark entry point; its stdout becomes the result file
    pub bench: Step,
    pub format: OutputFormat,
}

/// The full command surface of the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Benchmark-runner installation commands run by `init`
    #[serde(default)]
    pub tooling: Vec<Step>,
    pub targets: Vec<Target>,
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| {
    let backend = Path::new(BACKEND_DIR);
    let criterion = |name: &str, description: &str| Target {
        name: name.to_string(),
        description: description.to_string(),
        workdir: backend.join(name),
        source: None,
        setup: Vec::new(),
        bench: Step::new("cargo", CARGO_CRITERION_ARGS),
        format: OutputFormat::Json,
    };

    let gnark_checkout = backend.join("gnark").join("gnark-crypto");
    let mcl_checkout = backend.join("mcl").join("mcl");

    Catalog {
        tooling: vec![Step::new("cargo", &["install", "cargo-criterion"])],
        targets: vec![
            criterion("arkworks", "arkworks BLS12-381 (Rust, criterion)"),
            criterion("blstrs", "blstrs BLS12-381 over blst (Rust, criterion)"),
            criterion("zkcrypto", "zkcrypto bls12_381 (Rust, criterion)"),
            Target {
                name: "gnark-crypto".to_string(),
                description: "gnark-crypto BLS12-381 (Go, go test -json)".to_string(),
                workdir: gnark_checkout.clone(),
                source: Some(Source {
                    repository: "https://github.com/Consensys/gnark-crypto".to_string(),
                    checkout: gnark_checkout,
                    revision: None,
                }),
                setup: vec![Step::new("go", &["mod", "download"])],
                bench: Step::new(
                    "go",
                    &["test", "-run=^$", "-bench=.", "-json", "./ecc/bls12-381"],
                ),
                format: OutputFormat::Json,
            },
            Target {
                name: "mcl".to_string(),
                description: "mcl BLS12-381 (C++, bench binary)".to_string(),
                workdir: mcl_checkout.clone(),
                source: Some(Source {
                    repository: "https://github.com/herumi/mcl".to_string(),
                    checkout: mcl_checkout,
                    revision: None,
                }),
                setup: vec![Step::new("make", &["-j4", "bin/bls12_test.exe"])],
                bench: Step::new("sh", &["-c", "./bin/bls12_test.exe"]),
                format: OutputFormat::Text,
            },
        ],
    }
});

impl Catalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Catalog {
        BUILTIN.clone()
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json_str(json: &str) -> Result<Catalog> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|e| ZkalcError::InvalidCatalog {
                reason: e.to_string(),
            })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file, refusing anything larger than
    /// [`config::MAX_CATALOG_SIZE_BYTES`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Catalog> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|e| ZkalcError::io(path, e))?;
        let mut json = String::new();
        file.take(config::MAX_CATALOG_SIZE_BYTES + 1)
            .read_to_string(&mut json)
            .map_err(|e| ZkalcError::io(path, e))?;
        if json.len() as u64 > config::MAX_CATALOG_SIZE_BYTES {
            return Err(ZkalcError::InvalidCatalog {
                reason: format!(
                    "{} exceeds {} bytes",
                    path.display(),
                    config::MAX_CATALOG_SIZE_BYTES
                ),
            });
        }
        Self::from_json_str(&json)
    }

    /// Look up a target by name.
    pub fn get(&self, name: &str) -> Result<&Target> {
        self.targets
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ZkalcError::UnknownTarget {
                name: name.to_string(),
            })
    }

    /// Target names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.name.as_str())
    }

    /// Checkout directories of every cloned target.
    pub fn checkouts(&self) -> impl Iterator<Item = &Path> {
        self.targets
            .iter()
            .filter_map(|t| t.source.as_ref())
            .map(|s| s.checkout.as_path())
    }

    /// Check the catalog invariants.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(invalid("catalog defines no targets".to_string()));
        }

        for step in &self.tooling {
            validate_step(step, "tooling")?;
        }

        let mut seen = BTreeSet::new();
        for target in &self.targets {
            validate_name(&target.name)?;
            if !seen.insert(target.name.as_str()) {
                return Err(invalid(format!("duplicate target `{}`", target.name)));
            }

            validate_relative(&target.workdir, &target.name, "workdir")?;
            if let Some(source) = &target.source {
                if source.repository.trim().is_empty() {
                    return Err(invalid(format!(
                        "target `{}` has an empty repository URL",
                        target.name
                    )));
                }
                validate_relative(&source.checkout, &target.name, "checkout")?;
            }

            for step in &target.setup {
                validate_step(step, &target.name)?;
            }
            validate_step(&target.bench, &target.name)?;
        }

        Ok(())
    }
}

fn invalid(reason: String) -> ZkalcError {
    ZkalcError::InvalidCatalog { reason }
}

/// Names become file names and CLI subcommands.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid("target name is empty".to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid(format!(
            "target name `{}` may only contain letters, digits, '-', '_' and '.'",
            name
        )));
    }
    if name.starts_with('.') {
        return Err(invalid(format!("target name `{}` starts with '.'", name)));
    }
    if RESERVED_TARGET_NAMES.contains(&name) {
        return Err(invalid(format!("target name `{}` is reserved", name)));
    }
    Ok(())
}

fn validate_relative(path: &Path, target: &str, field: &str) -> Result<()> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    let names_root = !path.components().any(|c| matches!(c, Component::Normal(_)));
    if escapes || names_root {
        return Err(invalid(format!(
            "target `{}` {} `{}` must be a relative path inside the root",
            target,
            field,
            path.display()
        )));
    }
    Ok(())
}

fn validate_step(step: &Step, owner: &str) -> Result<()> {
    if step.program.trim().is_empty() {
        return Err(invalid(format!("`{}` has a step with no program", owner)));
    }
    Ok(())
}
