//! pivotsql command line.
//!
//! Hunts logic bugs in an embedded DuckDB with Pivoted Query Synthesis.
//!
//! # Quick Start
//!
//! ```bash
//! # Four workers, 1000 invocations each, both oracles
//! pivotsql run --seed 42
//!
//! # Replay a single worker that reported a finding
//! pivotsql run --seed 1234567 --workers 1
//!
//! # Inspect the merged configuration
//! pivotsql config show --format toml
//! ```

mod campaign;
mod commands;
mod style;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pivotsql_config::OracleSelection;
use tracing_subscriber::EnvFilter;

/// pivotsql - find logic bugs in SQL engines with pivoted query synthesis.
#[derive(Parser)]
#[command(name = "pivotsql")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Run PQS workers against fresh in-memory databases.
    Run {
        /// Master seed; worker N runs with seed + N.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Oracle invocations per worker.
        #[arg(short, long)]
        iterations: Option<u64>,

        /// Number of parallel workers.
        #[arg(short, long)]
        workers: Option<usize>,

        /// Which oracle to run.
        #[arg(short, long, value_enum)]
        oracle: Option<OracleArg>,

        /// Write findings as JSON to this file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Project directory holding pivotsql.toml.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Disable colored output.
        #[arg(long)]
        no_color: bool,
    },

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the merged configuration.
    Show {
        /// Project directory holding pivotsql.toml.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ConfigFormat::Text)]
        format: ConfigFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OracleArg {
    Positive,
    Negative,
    Both,
}

impl From<OracleArg> for OracleSelection {
    fn from(arg: OracleArg) -> Self {
        match arg {
            OracleArg::Positive => OracleSelection::Positive,
            OracleArg::Negative => OracleSelection::Negative,
            OracleArg::Both => OracleSelection::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ConfigFormat {
    Text,
    Json,
    Toml,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Run {
            seed,
            iterations,
            workers,
            oracle,
            output,
            project,
            no_color,
        } => {
            style::set_no_color(no_color);
            let overrides = commands::run::Overrides {
                seed,
                iterations,
                workers,
                oracle: oracle.map(Into::into),
                output,
            };
            commands::run::run(&project, overrides)
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { project, format } => commands::config::show(&project, format),
        },
    }
}
