//! Error types for domain-blocklist.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlocklistError {
    #[error("Failed to fetch {url} after {attempts} attempts: {reason}")]
    Fetch {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Resolver error: {0}")]
    Resolver(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
