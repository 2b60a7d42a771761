//! ESENT utility
//!
//! Command-line tools for inspecting ESENT databases.
//!
//! # Commands
//!
//! - `dump-metadata` - List tables with their columns and indexes
//! - `create-sample` - Create a small database with one table of every type
//! - `dump-csv` - Print the records of a table as CSV
//!
//! Without the `native` feature on Windows the tools run against the
//! in-memory engine, whose databases vanish when the process exits, so
//! `create-sample --dump` is the way to see them work.

mod commands;

use std::io;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{CliResult, OutputFormat};

/// ESENT command-line database tools.
#[derive(Parser)]
#[command(name = "esentutil")]
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
    /// List tables, columns and indexes
    DumpMetadata {
        /// Path to the database file
        database: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a sample database
    CreateSample {
        /// Path of the database file to create
        database: String,

        /// Dump the metadata and records of the new database
        #[arg(short, long)]
        dump: bool,
    },

    /// Print the records of a table as CSV
    DumpCsv {
        /// Path to the database file
        database: String,

        /// Table to dump
        table: String,
    },

    /// Show version information
    Version,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let api = commands::open_api()?;
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::DumpMetadata { database, format } => {
            commands::dump_metadata::run(&api, &database, format, &mut out)?;
        }
        Commands::CreateSample { database, dump } => {
            commands::create_sample::run(&api, &database)?;
            if dump {
                commands::dump_metadata::run(&api, &database, OutputFormat::Text, &mut out)?;
                commands::dump_csv::run(&api, &database, commands::create_sample::TABLE, &mut out)?;
            }
        }
        Commands::DumpCsv { database, table } => {
            commands::dump_csv::run(&api, &database, &table, &mut out)?;
        }
        Commands::Version => {
            println!("esentutil v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
