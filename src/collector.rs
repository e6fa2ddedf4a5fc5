//! Benchmark collection: the operations behind every CLI target.
//!
//! ## Workflow
//!
//! 1. **`init()`**: installs the benchmark-runner tooling and creates the results directory.
//! 2. **`run_target()`**: makes the library's sources available (cloning when missing),
//!    installs its dependencies, and captures its benchmark stdout into
//!    `<outdir>/<name>.<ext>`.
//! 3. **`run_all()`**: runs every target in catalog order.
//! 4. **`clean()`**: removes the clones and the results directory.
//!
//! Execution is strictly sequential and stops at the first failure. Result files
//! written before a failure stay on disk; re-running a target overwrites its file.

use crate::catalog::{Catalog, Target};
use crate::config::Settings;
use crate::exec::{CommandRunner, Invocation};
use crate::metrics::{CleanReport, RunSummary, SourceStatus, TargetReport};
use crate::{Result, ZkalcError};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

/// Drives the catalog's commands through a [`CommandRunner`].
pub struct Collector<'a, R: CommandRunner> {
    catalog: &'a Catalog,
    settings: &'a Settings,
    runner: R,
}

impl<'a, R: CommandRunner> Collector<'a, R> {
    pub fn new(catalog: &'a Catalog, settings: &'a Settings, runner: R) -> Self {
        Self {
            catalog,
            settings,
            runner,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Install benchmark-runner tooling, then create the results directory.
    pub fn init(&mut self) -> Result<()> {
        let _span = info_span!("init").entered();

        for step in &self.catalog.tooling {
            info!("Installing tooling: {}", step);
            self.runner.run(&Invocation::new(step, &self.settings.root))?;
        }

        self.ensure_outdir()?;
        info!("Results directory ready: {}", self.settings.outdir.display());
        Ok(())
    }

    /// Make `target`'s sources available, cloning them if the checkout is missing.
    ///
    /// An existing checkout directory is trusted as-is and never re-cloned. A
    /// clone whose revision cannot be checked out is removed again, so the next
    /// run retries instead of benchmarking the default branch.
    pub fn ensure_source(&mut self, target: &Target) -> Result<SourceStatus> {
        let Some(source) = &target.source else {
            return Ok(SourceStatus::Local);
        };

        let checkout = self.settings.resolve(&source.checkout);
        if checkout.exists() {
            debug!("Clone already present at {}", checkout.display());
            return Ok(SourceStatus::Present);
        }

        if let Some(parent) = checkout.parent() {
            fs::create_dir_all(parent).map_err(|e| ZkalcError::io(parent, e))?;
        }

        info!("Cloning {} into {}", source.repository, checkout.display());
        let clone = Invocation {
            program: "git".to_string(),
            args: vec![
                "clone".to_string(),
                source.repository.clone(),
                source.checkout.display().to_string(),
            ],
            cwd: self.settings.root.clone(),
            stdout: None,
        };
        self.runner.run(&clone)?;

        if let Some(revision) = &source.revision {
            info!("Checking out {}", revision);
            let checkout_rev = Invocation {
                program: "git".to_string(),
                args: vec![
                    "-C".to_string(),
                    source.checkout.display().to_string(),
                    "checkout".to_string(),
                    revision.clone(),
                ],
                cwd: self.settings.root.clone(),
                stdout: None,
            };
            if let Err(err) = self.runner.run(&checkout_rev) {
                warn!("Removing {}: revision {} unavailable", checkout.display(), revision);
                remove_path(&checkout)?;
                return Err(err);
            }
        }

        Ok(SourceStatus::Cloned)
    }

    /// Run one target and capture its benchmark output.
    pub fn run_target(&mut self, name: &str) -> Result<TargetReport> {
        let catalog = self.catalog;
        let target = catalog.get(name)?;
        let _span = info_span!("target", name = %target.name).entered();

        self.ensure_outdir()?;
        let source = self.ensure_source(target)?;
        let workdir = self.settings.resolve(&target.workdir);

        let setup_start = Instant::now();
        for step in &target.setup {
            info!("Installing dependencies: {}", step);
            self.runner.run(&Invocation::new(step, &workdir))?;
        }
        let setup_duration = setup_start.elapsed();

        let output = self.settings.output_path(target);
        info!("Benchmarking: {} 1> {}", target.bench, output.display());
        let bench_start = Instant::now();
        self.runner
            .run(&Invocation::new(&target.bench, &workdir).capture_to(&output))?;
        let bench_duration = bench_start.elapsed();

        let bytes_written = fs::metadata(&output)
            .map_err(|e| ZkalcError::io(&output, e))?
            .len();
        if bytes_written == 0 {
            warn!("{} produced no output", target.name);
        }

        let report = TargetReport {
            name: target.name.clone(),
            output,
            source,
            setup_duration,
            bench_duration,
            bytes_written,
        };
        info!("✓ {}", report.format());
        Ok(report)
    }

    /// Run `names` in order, stopping at the first failure.
    ///
    /// Every name is looked up before anything runs, so a typo fails fast.
    pub fn run_targets<S: AsRef<str>>(&mut self, names: &[S]) -> Result<RunSummary> {
        for name in names {
            self.catalog.get(name.as_ref())?;
        }

        let mut summary = RunSummary::default();
        for name in names {
            summary.reports.push(self.run_target(name.as_ref())?);
        }
        Ok(summary)
    }

    /// Run every target in catalog order.
    pub fn run_all(&mut self) -> Result<RunSummary> {
        let catalog = self.catalog;
        let names: Vec<&str> = catalog.names().collect();
        self.run_targets(&names)
    }

    /// Remove every clone and the results directory. Missing paths are skipped.
    ///
    /// Directories created only to hold a clone are removed once empty. Fails
    /// before deleting anything when the results directory overlaps the root
    /// or a target's sources.
    pub fn clean(&self) -> Result<CleanReport> {
        let _span = info_span!("clean").entered();
        self.settings.check_outdir(self.catalog)?;
        let mut report = CleanReport::default();

        let checkouts: Vec<_> = self
            .catalog
            .checkouts()
            .map(|c| self.settings.resolve(c))
            .collect();
        for path in checkouts.iter().chain(std::iter::once(&self.settings.outdir)) {
            if remove_path(path)? {
                info!("Removed {}", path.display());
                report.removed.push(path.clone());
            } else {
                debug!("Already absent: {}", path.display());
                report.skipped.push(path.clone());
            }
        }

        for checkout in &checkouts {
            prune_empty_parents(checkout, &self.settings.root)?;
        }

        Ok(report)
    }

    fn ensure_outdir(&self) -> Result<()> {
        let outdir = &self.settings.outdir;
        fs::create_dir_all(outdir).map_err(|e| ZkalcError::io(outdir, e))
    }
}

/// Delete a file or directory tree. Returns `false` when nothing was there.
fn remove_path(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(ZkalcError::io(path, e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| ZkalcError::io(path, e))?;
    Ok(true)
}

/// Remove the now-empty directories between `path` and `root`, innermost first.
fn prune_empty_parents(path: &Path, root: &Path) -> Result<()> {
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir == root || !dir.starts_with(root) {
            break;
        }
        let mut entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                current = dir.parent();
                continue;
            }
            Err(e) => return Err(ZkalcError::io(dir, e)),
        };
        if entries.next().is_some() {
            break;
        }
        fs::remove_dir(dir).map_err(|e| ZkalcError::io(dir, e))?;
        debug!("Removed empty {}", dir.display());
        current = dir.parent();
    }
    Ok(())
}
