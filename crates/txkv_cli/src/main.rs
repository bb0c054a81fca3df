//! txkv CLI
//!
//! Command-line driver for the txkv store.
//!
//! # Commands
//!
//! - `scenario` - Run the visibility scenarios against a fixture store
//! - `stress` - Run concurrent commits against snapshot readers
//! - `version` - Show version information

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// txkv transactional store tools.
#[derive(Parser)]
#[command(name = "txkv")]
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
    /// Run visibility scenarios against the fixture table
    Scenario {
        /// Run only this scenario (default: all)
        #[arg(short, long)]
        name: Option<String>,

        /// Give transactions a snapshot of the table taken at begin
        #[arg(short, long)]
        snapshot: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Run concurrent writers against snapshot readers
    Stress {
        /// Number of writer threads (the same number of readers is started)
        #[arg(short, long, default_value = "4")]
        threads: usize,

        /// Operations per thread
        #[arg(short, long, default_value = "1000")]
        operations: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Scenario {
            name,
            snapshot,
            format,
        } => {
            commands::scenario::run(name.as_deref(), snapshot, &format)?;
        }
        Commands::Stress {
            threads,
            operations,
            format,
        } => {
            commands::stress::run(threads, operations, &format)?;
        }
        Commands::Version => {
            println!("txkv CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("txkv Core v{}", txkv_core::VERSION);
        }
    }

    Ok(())
}
