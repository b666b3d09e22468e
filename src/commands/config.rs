//! Config command implementation.

use anyhow::Result;

use crate::config::Config;

/// Print the default configuration
pub fn run() -> Result<()> {
    print!("{}", Config::default().to_yaml()?);
    Ok(())
}
