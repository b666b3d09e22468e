//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "domain-blocklist")]
#[command(author, version, about = "Aggregate public domain blocklists into DNS sinkhole lists")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (for cron/systemd timer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every source, verify domains and write the blocklists
    Update {
        /// Directory receiving the four list files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Dry-run mode: fetch and verify but don't write any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Drop subdomains already covered by a parent in an existing list
    Optimize {
        /// Newline-delimited domain list
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the default configuration as YAML
    Config,

    /// Show version
    Version,
}
