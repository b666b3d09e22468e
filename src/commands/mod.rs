//! CLI command implementations.

pub mod config;
pub mod optimize;
pub mod update;

use anyhow::Result;
use std::path::Path;

use crate::config::Config;

/// Load `path` when given, otherwise the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}
