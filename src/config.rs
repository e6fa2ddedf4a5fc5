//! Centralized configuration for the benchmark collector.
//!
//! This module contains constants and the [`Settings`] value that locates the
//! repository root and the results directory on disk.

use crate::catalog::{Catalog, Target};
use crate::{Result, ZkalcError};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

// --- Filesystem Layout ---

/// Results directory, relative to the repository root, when nothing overrides it.
pub const DEFAULT_OUTDIR: &str = "perf/data";

/// Environment variable that overrides the results directory.
pub const OUTDIR_ENV: &str = "ZKALC_OUTDIR";

/// Directory holding the per-library benchmark crates and clones.
pub const BACKEND_DIR: &str = "backend";

// --- Catalog I/O Constants ---

/// Maximum size for a catalog file (1 MB)
pub const MAX_CATALOG_SIZE_BYTES: u64 = 1024 * 1024;

/// Command names reserved by the CLI; targets may not shadow them.
pub const RESERVED_TARGET_NAMES: &[&str] = &["init", "clean", "all", "list", "fit", "run"];

// --- Benchmark Runner Tooling ---

/// Criterion runner invocation shared by the Rust targets.
pub const CARGO_CRITERION_ARGS: &[&str] = &["criterion", "--message-format=json"];

/// Operation count used for the back-of-the-envelope estimate printed while fitting.
pub const FIT_ESTIMATE_OPERATIONS: f64 = (1u64 << 28) as f64;

/// Where the collector reads sources from and writes results to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Repository root; catalog paths are relative to it
    pub root: PathBuf,
    /// Results directory (absolute, or already joined onto `root`)
    pub outdir: PathBuf,
}

impl Settings {
    /// Settings rooted at `root` with the default results directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let outdir = root.join(DEFAULT_OUTDIR);
        Self { root, outdir }
    }

    /// Override the results directory. Relative paths are resolved against the root.
    pub fn with_outdir(mut self, outdir: impl AsRef<Path>) -> Self {
        self.outdir = self.resolve(outdir);
        self
    }

    /// Resolve a catalog-relative path against the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Make sure deleting the results directory cannot take sources with it.
    ///
    /// The results directory may not be the root, one of its ancestors, or a
    /// directory holding any target's workdir or checkout.
    pub fn check_outdir(&self, catalog: &Catalog) -> Result<()> {
        let outdir = canonical(&self.outdir)?;
        let unsafe_outdir = |reason: String| ZkalcError::UnsafeOutdir {
            path: self.outdir.clone(),
            reason,
        };

        if canonical(&self.root)?.starts_with(&outdir) {
            return Err(unsafe_outdir("it contains the repository root".to_string()));
        }

        for target in &catalog.targets {
            let checkout = target.source.as_ref().map(|s| s.checkout.as_path());
            for path in std::iter::once(target.workdir.as_path()).chain(checkout) {
                if canonical(&self.resolve(path))?.starts_with(&outdir) {
                    return Err(unsafe_outdir(format!(
                        "it contains {} used by `{}`",
                        path.display(),
                        target.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Result file for `target`: `<outdir>/<name>.<ext>`.
    pub fn output_path(&self, target: &Target) -> PathBuf {
        self.outdir
            .join(format!("{}.{}", target.name, target.format.extension()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Absolute form of `path` with `.` and `..` folded away and symlinks resolved
/// on the longest prefix that exists.
fn canonical(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = env::current_dir().map_err(|e| ZkalcError::io(".", e))?;
        cwd.join(path)
    };

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    let mut existing = lexical.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(resolved) = fs::canonicalize(existing) {
            return Ok(missing
                .iter()
                .rev()
                .fold(resolved, |acc, part| acc.join(part)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return Ok(lexical.clone()),
        }
    }
}
