//! shopsync CLI
//!
//! Command-line tools for working with synchronization datasets.
//!
//! # Commands
//!
//! - `validate` - Run a dataset through the upload reconciler and report
//!   per-row outcomes
//! - `feed` - Print one change feed page for an entity of a dataset
//! - `inspect` - Print per-table row counts of a dataset

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shop synchronization command-line tools.
#[derive(Parser)]
#[command(name = "shopsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a dataset through the upload reconciler and report outcomes
    Validate {
        /// Path to the dataset JSON file
        file: PathBuf,
    },

    /// Print one change feed page for an entity of a dataset
    Feed {
        /// Path to the dataset JSON file
        file: PathBuf,

        /// Entity table to query
        #[arg(short, long)]
        entity: String,

        /// Cursor: only rows modified strictly after this timestamp
        #[arg(short, long)]
        since: Option<String>,

        /// Restrict to one shop
        #[arg(long)]
        shop: Option<i64>,

        /// Page size cap
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print per-table row counts of a dataset
    Inspect {
        /// Path to the dataset JSON file
        file: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Validate { file } => commands::validate::run(&file)?,
        Commands::Feed {
            file,
            entity,
            since,
            shop,
            limit,
        } => commands::feed::run(&file, &entity, since.as_deref(), shop, limit)?,
        Commands::Inspect { file } => commands::inspect::run(&file)?,
        Commands::Version => {
            println!("shopsync {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
