//! zkalc benchmark collector
//!
//! This library drives the benchmark suites of external elliptic-curve and
//! pairing libraries across ecosystems (Rust criterion, Go, C++) and collects
//! their raw output into a single results directory for later comparison.
//! All measurement work is delegated to the libraries' own harnesses; this
//! crate only runs them, in order, and keeps track of where output lands.
//!
//! ## Main Components
//!
//! - [`catalog`]: Declarative table of targets, tooling, and their commands
//! - [`collector`]: `init`, per-target runs, `run_all`, and `clean`
//! - [`exec`]: Subprocess seam and the real `std::process` runner
//! - [`fit`]: Criterion output normalization and cost-function fitting
//! - [`metrics`]: Run reports and CLI tables
//! - [`config`]: Centralized constants and filesystem settings
//!
//! ## Error Handling
//!
//! Operations return `Result<T, ZkalcError>`. A benchmark that exits with a
//! non-zero status surfaces as [`ZkalcError::CommandFailed`] carrying the
//! child's exit code, which the binary hands back to the shell.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zkalc_collect::{Catalog, Collector, Settings, SystemRunner, ZkalcError};
//!
//! let catalog = Catalog::builtin();
//! let settings = Settings::new(".").with_outdir("perf/data");
//! let mut collector = Collector::new(&catalog, &settings, SystemRunner::new());
//!
//! collector.init()?;
//! let report = collector.run_target("blstrs")?;
//! println!("{}", report.format());
//!
//! collector.clean()?;
//! # Ok::<(), ZkalcError>(())
//! ```
//!
//! ### Fitting criterion output
//!
//! ```rust,no_run
//! use std::{fs::File, io::BufReader};
//! use zkalc_collect::{fit, ZkalcError};
//!
//! let path = "perf/data/blstrs.json";
//! let file = File::open(path).map_err(|e| ZkalcError::io(path, e))?;
//! let functions = fit::fit_reader(BufReader::new(file))?;
//! println!("{}", serde_json::to_string(&functions)?);
//! # Ok::<(), ZkalcError>(())
//! ```

pub mod catalog;
pub mod collector;
pub mod config;
pub mod error;
pub mod exec;
pub mod fit;
pub mod metrics;

// Re-export commonly used types and functions for convenience
pub use catalog::{Catalog, OutputFormat, Source, Step, Target};
pub use collector::Collector;
pub use config::Settings;
pub use error::{Result, ZkalcError};
pub use exec::{CommandRunner, Invocation, SystemRunner};
pub use metrics::{CleanReport, RunSummary, SourceStatus, TargetReport};
