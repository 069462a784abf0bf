//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate one page per data record from collection route components
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: pagegen.toml)
    #[arg(short = 'C', long, default_value = "pagegen.toml")]
    pub config: PathBuf,

    /// Page components directory (relative to project root)
    #[arg(short, long)]
    pub pages: Option<PathBuf>,

    /// Data directory for the built-in query engine (relative to project root)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run every collection component once and write the page manifest
    Build,

    /// Build, then re-run components whenever they or their data change
    Watch {
        /// Quiet period in milliseconds before a change triggers a re-run
        #[arg(long)]
        debounce: Option<u64>,
    },

    /// Only validate collection route patterns
    Check,
}
