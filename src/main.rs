//! zkalc benchmark collector
//!
//! Runs the benchmark suites of external curve libraries and collects their raw
//! output into one results directory:
//! - `init` installs the benchmark runners and creates the results directory
//! - `<library>` (or `run <library>...`) benchmarks one or more libraries
//! - `all` benchmarks every library in the catalog
//! - `clean` removes clones and results
//! - `fit` turns criterion output into per-operation cost functions
//!
//! Run with: cargo run --release -- init && cargo run --release -- blstrs

use clap::{ArgAction, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zkalc_collect::{
    fit, Catalog, Collector, Result, RunSummary, Settings, SystemRunner, ZkalcError,
};

/// Command-line arguments for the benchmark collector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository root; catalog paths are relative to it [default: .]
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Results directory (relative paths are resolved against --root)
    #[arg(long, global = true, env = "ZKALC_OUTDIR")]
    outdir: Option<PathBuf>,

    /// JSON catalog replacing the built-in target table
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Increase output verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Install benchmark-runner tooling and create the results directory
    Init,
    /// Benchmark the named libraries, in order
    Run {
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Benchmark every library in the catalog
    All,
    /// Remove cloned repositories and the results directory
    Clean,
    /// List the available targets
    List,
    /// Fit criterion JSON output to per-operation cost functions
    Fit {
        /// Criterion output to read (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Where to write the JSON result (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit normalized ns-per-op records instead of fitted functions
        #[arg(long, default_value_t = false)]
        measurements: bool,
    },
    /// Any other word is a library name: `zkalc-collect blstrs`
    #[command(external_subcommand)]
    Target(Vec<String>),
}

/// Everything after a bare library name: more names and the global flags.
#[derive(Parser, Debug)]
#[command(name = "zkalc-collect <library>", no_binary_name = true)]
struct TargetArgs {
    #[arg(required = true)]
    targets: Vec<String>,

    #[arg(long)]
    root: Option<PathBuf>,

    #[arg(long)]
    outdir: Option<PathBuf>,

    #[arg(long)]
    catalog: Option<PathBuf>,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Rewrite `<library> [args]` into `run <library> [args]`.
    ///
    /// Flags after the library name win over the ones before it, the same as
    /// repeating a flag anywhere else on the command line.
    fn expand_target(self) -> Self {
        let Command::Target(words) = &self.command else {
            return self;
        };
        let trailing = TargetArgs::parse_from(words);
        Cli {
            root: trailing.root.or(self.root),
            outdir: trailing.outdir.or(self.outdir),
            catalog: trailing.catalog.or(self.catalog),
            verbose: self.verbose.saturating_add(trailing.verbose),
            command: Command::Run {
                targets: trailing.targets,
            },
        }
    }
}

fn main() {
    let cli = Cli::parse().expand_target();

    // Initialize tracing
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        error!("{}", err);
        std::process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_json_file(path)?,
        None => Catalog::builtin(),
    };

    let root = cli.root.unwrap_or_else(|| PathBuf::from("."));
    let mut settings = Settings::new(root);
    if let Some(outdir) = &cli.outdir {
        settings = settings.with_outdir(outdir);
    }

    match cli.command {
        Command::Init => Collector::new(&catalog, &settings, SystemRunner::new()).init(),
        Command::Run { targets } | Command::Target(targets) => {
            let mut collector = Collector::new(&catalog, &settings, SystemRunner::new());
            let summary = collector.run_targets(&targets)?;
            display_summary(&summary);
            Ok(())
        }
        Command::All => {
            let mut collector = Collector::new(&catalog, &settings, SystemRunner::new());
            let summary = collector.run_all()?;
            display_summary(&summary);
            Ok(())
        }
        Command::Clean => {
            let report = Collector::new(&catalog, &settings, SystemRunner::new()).clean()?;
            info!("✓ {}", report.format());
            Ok(())
        }
        Command::List => list_targets(&catalog, &settings),
        Command::Fit {
            input,
            output,
            measurements,
        } => run_fit(input.as_deref(), output.as_deref(), measurements),
    }
}

fn display_summary(summary: &RunSummary) {
    info!("");
    info!("Collected {} result file(s)", summary.reports.len());
    for line in summary.format_table().lines() {
        info!("{}", line);
    }
}

fn list_targets(catalog: &Catalog, settings: &Settings) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for target in &catalog.targets {
        let origin = match &target.source {
            Some(source) => source.repository.as_str(),
            None => "local",
        };
        writeln!(
            stdout,
            "{:<16} {:<48} {} [{}]",
            target.name,
            target.description,
            settings.output_path(target).display(),
            origin
        )
        .map_err(|e| ZkalcError::io("<stdout>", e))?;
    }
    Ok(())
}

fn run_fit(input: Option<&Path>, output: Option<&Path>, measurements: bool) -> Result<()> {
    let json = match input {
        Some(path) => {
            let file = File::open(path).map_err(|e| ZkalcError::io(path, e))?;
            render_fit(BufReader::new(file), measurements)?
        }
        None => render_fit(io::stdin().lock(), measurements)?,
    };

    match output {
        Some(path) => std::fs::write(path, json).map_err(|e| ZkalcError::io(path, e))?,
        None => io::stdout()
            .write_all(json.as_bytes())
            .map_err(|e| ZkalcError::io("<stdout>", e))?,
    }

    info!("[!] Results written! Bye!");
    Ok(())
}

fn render_fit<R: io::BufRead>(reader: R, measurements: bool) -> Result<String> {
    if measurements {
        let records = fit::extract_measurements(reader)?.records();
        Ok(serde_json::to_string_pretty(&records)?)
    } else {
        let functions = fit::fit_reader(reader)?;
        Ok(serde_json::to_string(&functions)?)
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info,zkalc_collect=info",
        1 => "debug,zkalc_collect=debug",
        _ => "zkalc_collect=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    use tracing_tree::HierarchicalLayer;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            HierarchicalLayer::new(2)
                .with_targets(false)
                .with_bracketed_fields(true),
        )
        .init();
}
