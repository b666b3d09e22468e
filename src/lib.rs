//! # domain-blocklist - Domain Blocklist Aggregator
//!
//! Downloads public ad/tracker/malware domain lists, keeps the lines that are
//! well-formed domains under a real public suffix, drops whitelisted entries,
//! verifies that each remaining domain still exists through a DNS-over-HTTPS
//! JSON endpoint, and writes four newline-delimited lists ready for a DNS
//! sinkhole.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     domain-blocklist                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: update, optimize, config, version          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Sources, TLD URLs, resolver, retries, whitelist      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)                                 │
//! │    ├── TLD bootstrap (IANA list, public suffix list)        │
//! │    └── Streamed blocklist sources                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Processor                                                  │
//! │    └── Line validator → TLD classifier → whitelist          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Verifier (ExistenceOracle trait)                           │
//! │    └── DohResolver: NXDOMAIN drops, failures keep           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Output                                                     │
//! │    └── Optimizer, shortlink variants, atomic file writes    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use domain_blocklist::config::Config;
//! use domain_blocklist::output::BlocklistVariants;
//! use domain_blocklist::pipeline::Pipeline;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("blocklist.yaml")?;
//!
//!     let pipeline = Pipeline::from_config(&config)?;
//!     let outcome = pipeline.run(&config).await?;
//!     println!("{}", outcome.summary);
//!
//!     let variants = BlocklistVariants::build(&outcome.domains, &config.shortlinks);
//!     variants.write_all(Path::new("."), &config.output);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - YAML configuration with built-in defaults
//! - [`validator`] - Line formats and the domain syntax check
//! - [`tld`] - Public suffix classification
//! - [`whitelist`] - Domain exclusion rules
//! - [`fetcher`] - HTTP downloads with retry
//! - [`processor`] - Per-source filtering
//! - [`resolver`] - DNS-over-HTTPS existence queries
//! - [`verifier`] - Retry and fail-open policy for existence checks
//! - [`pipeline`] - Bounded-concurrency orchestration
//! - [`optimizer`] - Subdomain reduction
//! - [`output`] - Blocklist variants and file writing

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod optimizer;
pub mod output;
pub mod pipeline;
pub mod processor;
pub mod resolver;
pub mod summary;
pub mod tld;
pub mod validator;
pub mod verifier;
pub mod whitelist;
