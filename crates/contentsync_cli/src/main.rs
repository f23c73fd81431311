//! contentsync CLI
//!
//! Command-line tools for copying content between environments.
//!
//! # Commands
//!
//! - `resolve` - Print the dependency tree of an entry
//! - `plan` - Print the order in which items would be written
//! - `sync` - Copy an entry and everything it depends on to a target file
//! - `version` - Show version information

mod commands;
mod export;

use clap::{Args, Parser, Subcommand, ValueEnum};
use contentsync_core::DEFAULT_MAX_DEPTH;
use contentsync_model::DEFAULT_LOCALE;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Copies content entries and their dependencies between environments.
#[derive(Parser)]
#[command(name = "contentsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable text
    Text,
    /// JSON document
    Json,
}

/// Options shared by every command that reads a source export.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Root entry identifier
    pub id: String,

    /// Source export file
    #[arg(short, long)]
    pub source: PathBuf,

    /// Stop following links at this depth
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Locale used for display titles
    #[arg(short, long, default_value = DEFAULT_LOCALE)]
    pub locale: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dependency tree of an entry
    Resolve(SourceArgs),

    /// Print the order in which items would be written
    Plan(SourceArgs),

    /// Copy an entry and its dependencies into a target export file
    Sync {
        #[command(flatten)]
        args: SourceArgs,

        /// Target export file, created if missing
        #[arg(short, long)]
        target: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve(args) => commands::resolve::run(&args)?,
        Commands::Plan(args) => commands::plan::run(&args)?,
        Commands::Sync { args, target } => commands::sync::run(&args, &target)?,
        Commands::Version => {
            println!("contentsync CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
