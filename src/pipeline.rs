//! Bounded-concurrency pipeline.
//!
//! ```text
//!  TLD bootstrap ──► Stage A: one task per source ──► candidate set (mutex)
//!                                                          │
//!  final set ◄── aggregator ◄── mpsc ◄── Stage B: one task per candidate,
//!                                        gated by a semaphore
//! ```
//!
//! Stage A finishes completely before Stage B starts. In Stage B only the
//! aggregator task writes to the final set; verification tasks hand their
//! results over a channel.

use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::config::{Config, SourceConfig};
use crate::fetcher::{build_client, Fetcher};
use crate::processor::{process_source, DomainFilter};
use crate::resolver::DohResolver;
use crate::summary::{format_count, RunSummary};
use crate::tld::TldClassifier;
use crate::verifier::ExistenceVerifier;

/// Buffer between verification tasks and the aggregator
const AGGREGATOR_CHANNEL_CAPACITY: usize = 20;

/// Output of Stage A.
#[derive(Debug, Default)]
pub struct Candidates {
    pub domains: HashSet<String>,
    pub failed_sources: usize,
}

/// Output of a full run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub domains: HashSet<String>,
    pub summary: RunSummary,
}

/// Runs both fan-out stages.
pub struct Pipeline {
    fetcher: Fetcher,
    verifier: ExistenceVerifier,
    max_concurrent_checks: usize,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, verifier: ExistenceVerifier, max_concurrent_checks: usize) -> Self {
        Self {
            fetcher,
            verifier,
            max_concurrent_checks: max_concurrent_checks.max(1),
        }
    }

    /// Build a pipeline talking to the configured resolver endpoint.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_client()?;
        let fetcher = Fetcher::with_client(client.clone(), config.fetch_retry);
        let resolver = DohResolver::new(client, config.resolver.endpoint.clone());
        debug!("Existence checks go to {}", resolver.endpoint());
        let verifier = ExistenceVerifier::new(Arc::new(resolver), config.resolver.retry);
        Ok(Self::new(
            fetcher,
            verifier,
            config.resolver.max_concurrent_checks,
        ))
    }

    /// Bootstrap TLD data, collect candidates from every source, then
    /// verify them.
    pub async fn run(&self, config: &Config) -> Result<RunOutcome> {
        let whitelist = Arc::new(config.compile_whitelist()?);
        debug!("{} whitelist rules loaded", whitelist.len());
        let tlds = TldClassifier::bootstrap(
            &self.fetcher,
            &config.tld.tld_list_url,
            &config.tld.effective_tld_url,
        )
        .await;
        if tlds.is_empty() {
            warn!("No TLD data available, every domain will be rejected");
        }
        let filter = DomainFilter::new(Arc::new(tlds), whitelist);

        let candidates = self.collect_candidates(&config.sources, &filter).await;
        let candidate_count = candidates.domains.len();
        let domains = self.verify_candidates(candidates.domains).await;

        let summary = RunSummary {
            sources: config.sources.len(),
            failed_sources: candidates.failed_sources,
            candidates: candidate_count,
            verified: domains.len(),
        };
        Ok(RunOutcome { domains, summary })
    }

    /// Stage A: process every source concurrently and merge the results.
    pub async fn collect_candidates(
        &self,
        sources: &[SourceConfig],
        filter: &DomainFilter,
    ) -> Candidates {
        info!("Collecting domains from {} sources...", sources.len());

        let merged = Arc::new(Mutex::new(HashSet::new()));
        let mut tasks = JoinSet::new();

        for source in sources.iter().cloned() {
            let fetcher = self.fetcher.clone();
            let filter = filter.clone();
            let merged = Arc::clone(&merged);
            tasks.spawn(async move {
                match process_source(&fetcher, &source, &filter).await {
                    Ok(domains) => {
                        merged.lock().extend(domains);
                        true
                    }
                    Err(e) => {
                        warn!("Skipping source: {}", e);
                        false
                    }
                }
            });
        }

        let mut failed_sources = 0;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(true) => {}
                Ok(false) => failed_sources += 1,
                Err(e) => {
                    log_join_error("Source", e);
                    failed_sources += 1;
                }
            }
        }

        // Every task has been joined, so this is the only handle left.
        let domains = std::mem::take(&mut *merged.lock());
        info!(
            "Collected {} candidate domains ({} sources failed)",
            format_count(domains.len()),
            failed_sources
        );
        Candidates {
            domains,
            failed_sources,
        }
    }

    /// Stage B: verify every candidate with at most `max_concurrent_checks`
    /// checks in flight, and return the domains that still exist.
    pub async fn verify_candidates(&self, candidates: HashSet<String>) -> HashSet<String> {
        info!(
            "Verifying {} domains ({} concurrent checks)...",
            format_count(candidates.len()),
            self.max_concurrent_checks
        );

        let (tx, mut rx) = mpsc::channel::<String>(AGGREGATOR_CHANNEL_CAPACITY);
        let aggregator = tokio::spawn(async move {
            let mut final_domains = HashSet::new();
            while let Some(domain) = rx.recv().await {
                final_domains.insert(domain);
            }
            final_domains
        });

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_checks));
        let mut tasks = JoinSet::new();

        for domain in candidates {
            // The semaphore is never closed.
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let verifier = self.verifier.clone();
            let tx = tx.clone();
            tasks.spawn(async move {
                let _permit = permit;
                if verifier.exists(&domain).await && tx.send(domain).await.is_err() {
                    error!("Aggregator stopped before all domains were verified");
                }
            });

            while let Some(result) = tasks.try_join_next() {
                if let Err(e) = result {
                    log_join_error("Verification", e);
                }
            }
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                log_join_error("Verification", e);
            }
        }

        // All producers are done; dropping the last sender lets the
        // aggregator drain the buffer and stop.
        drop(tx);
        let final_domains = match aggregator.await {
            Ok(domains) => domains,
            Err(e) => {
                log_join_error("Aggregator", e);
                HashSet::new()
            }
        };

        info!("{} domains verified", format_count(final_domains.len()));
        final_domains
    }
}

fn log_join_error(stage: &str, e: JoinError) {
    error!("{} task failed: {}", stage, e);
}
