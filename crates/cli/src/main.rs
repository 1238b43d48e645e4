mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use args::InitArgs;
use commands::{init, inspect, validate};

/// ABISS: Approximate Bayesian Inference of Speciation Scenarios
///
/// Tooling around reference tables of simulated two-population demographies:
/// write run configurations, inspect and validate persisted tables.
#[derive(Parser, Debug)]
#[command(name = "abiss")]
#[command(author, version, about = "Reference tables for demographic model choice", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a run configuration.
    ///
    /// Priors, block settings and topologies are stored as JSON so a build
    /// can be reproduced exactly.
    Init(Box<InitArgs>),

    /// Show the shape and contents of a reference table.
    Inspect {
        /// Reference table (.npz)
        table: PathBuf,
    },

    /// Check a reference table (and optionally an observed summary) for consistency.
    Validate {
        /// Reference table (.npz)
        table: PathBuf,

        /// Observed summary vector (.npz) to check against the table layout
        #[arg(long)]
        observed: Option<PathBuf>,

        /// Array name of the observed summary
        #[arg(long, default_value = defaults::OBSERVED_KEY)]
        key: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(level)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Init(args) => {
            init::init_config(&args)?;
        }
        Commands::Inspect { table } => {
            inspect::show_table(&table)?;
        }
        Commands::Validate {
            table,
            observed,
            key,
        } => {
            validate::validate_table(&table, observed.as_deref(), &key)?;
        }
    }

    Ok(())
}
