//! Update command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use super::load_config;
use crate::output::BlocklistVariants;
use crate::pipeline::Pipeline;

/// Run the update command
pub async fn run(output_dir: &Path, dry_run: bool, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    if config.sources.is_empty() {
        warn!("No sources configured. Check your configuration.");
    }

    if !dry_run {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;
    }

    info!("Updating blocklists...");

    let pipeline = Pipeline::from_config(&config)?;
    let outcome = pipeline.run(&config).await?;
    info!("{}", outcome.summary);

    let variants = BlocklistVariants::build(&outcome.domains, &config.shortlinks);

    if dry_run {
        info!(
            "[DRY-RUN] Would write {} domains ({} optimized) to {:?}",
            variants.plain.len(),
            variants.optimized.len(),
            output_dir
        );
        return Ok(());
    }

    let failures = variants.write_all(output_dir, &config.output);
    if failures > 0 {
        anyhow::bail!("{} of 4 blocklist files could not be written", failures);
    }

    println!(
        "[OK] {} domains blocked ({} after optimization)",
        variants.plain.len(),
        variants.optimized.len()
    );

    Ok(())
}
