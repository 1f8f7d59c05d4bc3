//! SegLog CLI
//!
//! Command-line tools for inspecting and operating on a SegLog directory.
//!
//! # Commands
//!
//! - `inspect` - Display offsets and per-segment statistics
//! - `append` - Append records
//! - `read` - Read records starting at an offset
//! - `export` - Write the raw store bytes of every segment to a file
//! - `truncate` - Remove segments at or below an offset
//! - `reset` - Delete the log and recreate it empty

mod commands;

use clap::{Parser, Subcommand};
use commands::LogOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SegLog command-line tools.
#[derive(Parser)]
#[command(name = "seglog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the log directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Store size at which segments rotate
    #[arg(global = true, long)]
    max_store_bytes: Option<u64>,

    /// Index size at which segments rotate
    #[arg(global = true, long)]
    max_index_bytes: Option<u64>,

    /// First offset of a newly created log
    #[arg(global = true, long)]
    initial_offset: Option<u64>,

    /// Store payloads as raw bytes instead of CBOR records
    #[arg(global = true, long)]
    raw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display offsets and segment statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Append records, one per value (or one per stdin line)
    Append {
        /// Values to append
        values: Vec<String>,

        /// Read values from stdin, one per line
        #[arg(long)]
        stdin: bool,
    },

    /// Read records starting at an offset
    Read {
        /// First offset to read
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// Maximum number of records to read
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write the raw store bytes of every segment to a file
    Export {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove segments whose records are all at or below an offset
    Truncate {
        /// Retention boundary
        #[arg(short, long)]
        lowest: u64,
    },

    /// Delete the log and recreate it empty
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
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
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = LogOptions {
        max_store_bytes: cli.max_store_bytes,
        max_index_bytes: cli.max_index_bytes,
        initial_offset: cli.initial_offset,
        raw: cli.raw,
    };

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Log path required for inspect")?;
            commands::inspect::run(&path, &options, &format)?;
        }
        Commands::Append { values, stdin } => {
            let path = cli.path.ok_or("Log path required for append")?;
            commands::append::run(&path, &options, values, stdin)?;
        }
        Commands::Read {
            offset,
            limit,
            format,
        } => {
            let path = cli.path.ok_or("Log path required for read")?;
            commands::read::run(&path, &options, offset, limit, &format)?;
        }
        Commands::Export { output } => {
            let path = cli.path.ok_or("Log path required for export")?;
            commands::export::run(&path, &options, &output)?;
        }
        Commands::Truncate { lowest } => {
            let path = cli.path.ok_or("Log path required for truncate")?;
            commands::truncate::run(&path, &options, lowest)?;
        }
        Commands::Reset { yes } => {
            let path = cli.path.ok_or("Log path required for reset")?;
            if !yes {
                return Err("Refusing to reset without --yes".into());
            }
            commands::reset::run(&path, &options)?;
        }
        Commands::Version => {
            println!("SegLog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("SegLog Core v{}", seglog_core::VERSION);
        }
    }

    Ok(())
}
