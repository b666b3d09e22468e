//! Optimize command implementation.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::optimizer::optimize;
use crate::output::write_blocklist;
use crate::validator::is_valid_domain;

/// Run the optimize command on an existing list file
pub fn run(input: &Path, output: Option<&Path>) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read list file: {:?}", input))?;

    let domains = parse_list(&content);
    let mut optimized: Vec<String> = optimize(&domains).into_iter().collect();
    optimized.sort();

    info!(
        "Optimized {} domains down to {}",
        domains.len(),
        optimized.len()
    );

    match output {
        Some(path) => write_blocklist(path, &optimized)?,
        None => {
            for domain in &optimized {
                println!("{}", domain);
            }
        }
    }

    Ok(())
}

/// Lower-cased valid domains of a newline-delimited list.
fn parse_list(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| is_valid_domain(line))
        .collect()
}
