//! recon - Architecture recovery for Python codebases
//!
//! Reconstructs a package's module dependency graph, scores each module by
//! size, complexity and centrality, prunes the noise and collapses what is
//! left into a package diagram.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;
mod render;
mod stats;

use commands::{graph::GraphArgs, GlobalOptions};
use config::ReconConfig;
use output::OutputFormat;

/// Recover the architecture of a Python package from its imports.
#[derive(Parser)]
#[command(name = "recon")]
#[command(author, version)]
#[command(about = "Recover the architecture of a Python package from its imports")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  recon scan src/zeeguu                     List discovered modules
  recon stats src/zeeguu                    Metric percentiles for threshold tuning
  recon graph src/zeeguu --loc-percentile 75 --min-cc 2
  recon graph src/zeeguu/core/model -p zeeguu.core.model --level module -F dot -o model.dot")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(short = 'F', long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Fail on .reconrc.toml errors instead of silently using defaults
    #[arg(long, global = true)]
    strict: bool,

    /// Compact output (minified JSON, borderless tables)
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the modules discovered under a package root
    Scan {
        /// Package root directory
        #[arg(default_value = ".")]
        path: String,

        /// Dotted prefix of the package (defaults to the root directory name)
        #[arg(short, long)]
        package: Option<String>,
    },

    /// Build, prune and collapse the dependency graph
    #[command(visible_alias = "g")]
    Graph(GraphArgs),

    /// Show metric percentiles for choosing thresholds
    Stats {
        /// Package root directory
        #[arg(default_value = ".")]
        path: String,

        /// Dotted prefix of the package (defaults to the root directory name)
        #[arg(short, long)]
        package: Option<String>,
    },
}

impl Commands {
    /// Directory holding the analysed package, where `.reconrc.toml` lives.
    fn root(&self) -> &str {
        match self {
            Commands::Scan { path, .. } | Commands::Stats { path, .. } => path,
            Commands::Graph(args) => &args.path,
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Handle case where no command is provided
    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    // Config lives in the analysed root and is loaded once for the whole run
    let config = ReconConfig::load_with(std::path::Path::new(command.root()), cli.strict)?;

    // Resolve output format: CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    if let Some(use_color) = config.use_color() {
        colored::control::set_override(use_color);
    }

    let opts = GlobalOptions {
        quiet: cli.quiet,
        compact: cli.compact,
    };

    match command {
        Commands::Scan { path, package } => {
            commands::scan::run(&path, package.as_deref(), &config, &opts, format)
        }
        Commands::Graph(args) => commands::graph::run(&args, &config, &opts, format),
        Commands::Stats { path, package } => {
            commands::stats::run(&path, package.as_deref(), &config, &opts, format)
        }
    }
}
