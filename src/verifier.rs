//! Existence verification with retry and fail-open semantics.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::resolver::{ExistenceOracle, NXDOMAIN};

/// Decides whether a candidate domain still exists.
///
/// Only a definite NXDOMAIN answer removes a domain. Errors of any kind are
/// retried, and a domain whose checks keep failing is kept.
#[derive(Clone)]
pub struct ExistenceVerifier {
    oracle: Arc<dyn ExistenceOracle>,
    retry: RetryPolicy,
}

impl ExistenceVerifier {
    pub fn new(oracle: Arc<dyn ExistenceOracle>, retry: RetryPolicy) -> Self {
        Self { oracle, retry }
    }

    /// `false` only if the resolver reported the domain as non-existent.
    pub async fn exists(&self, domain: &str) -> bool {
        let attempts = self.retry.attempts.max(1);

        for attempt in 1..=attempts {
            match self.oracle.query(domain).await {
                Ok(NXDOMAIN) => {
                    debug!("Resolver reports as non-existent: {}", domain);
                    return false;
                }
                Ok(_) => return true,
                Err(e) => {
                    debug!(
                        "Existence check {}/{} for {} failed: {}",
                        attempt, attempts, domain, e
                    );
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.retry.delay()).await;
            }
        }

        warn!(
            "Existence check for {} failed {} times, keeping it",
            domain, attempts
        );
        true
    }
}
