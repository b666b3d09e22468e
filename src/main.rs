//! domain-blocklist - aggregate public domain blocklists into DNS sinkhole lists.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use domain_blocklist::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Update {
            output_dir,
            dry_run,
        } => domain_blocklist::commands::update::run(&output_dir, dry_run, config).await,
        Commands::Optimize { input, output } => {
            domain_blocklist::commands::optimize::run(&input, output.as_deref())
        }
        Commands::Config => domain_blocklist::commands::config::run(),
        Commands::Version => {
            println!("domain-blocklist {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
