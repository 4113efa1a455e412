//! KVite CLI
//!
//! Command-line access to KVite buckets.
//!
//! # Commands
//!
//! - `buckets` - List bucket names
//! - `get` - Print a value
//! - `put` - Store a value
//! - `delete` - Remove a key
//! - `dump` - Print every entry of a bucket

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// KVite command-line tools.
#[derive(Parser)]
#[command(name = "kvite")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Namespace (backing table name)
    #[arg(global = true, short, long)]
    namespace: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bucket names
    Buckets {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the value stored under a key
    Get {
        /// Bucket name
        bucket: String,
        /// Key
        key: String,
    },

    /// Store a value under a key
    Put {
        /// Bucket name
        bucket: String,
        /// Key
        key: String,
        /// Value (stored as UTF-8 bytes)
        value: String,
    },

    /// Remove a key
    Delete {
        /// Bucket name
        bucket: String,
        /// Key
        key: String,
    },

    /// Print every entry of a bucket
    Dump {
        /// Bucket name
        bucket: String,

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
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let namespace = cli.namespace.as_deref();

    match cli.command {
        Commands::Buckets { format } => {
            let path = cli.path.ok_or("Database path required for buckets")?;
            commands::buckets::run(&path, namespace, &format)?;
        }
        Commands::Get { bucket, key } => {
            let path = cli.path.ok_or("Database path required for get")?;
            commands::get::run(&path, namespace, &bucket, &key)?;
        }
        Commands::Put { bucket, key, value } => {
            let path = cli.path.ok_or("Database path required for put")?;
            commands::put::run(&path, namespace, &bucket, &key, value.as_bytes())?;
        }
        Commands::Delete { bucket, key } => {
            let path = cli.path.ok_or("Database path required for delete")?;
            commands::delete::run(&path, namespace, &bucket, &key)?;
        }
        Commands::Dump { bucket, format } => {
            let path = cli.path.ok_or("Database path required for dump")?;
            commands::dump::run(&path, namespace, &bucket, &format)?;
        }
        Commands::Version => {
            println!("KVite CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("KVite Core v{}", kvite_core::VERSION);
        }
    }

    Ok(())
}
