//! Existence oracle backed by a DNS-over-HTTPS JSON API.
//!
//! The resolver is only asked one question: what `Status` does a lookup of
//! the domain return. `Status == 3` (NXDOMAIN) is the only answer that
//! marks a domain as non-existent.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::BlocklistError;

#[cfg(test)]
use mockall::automock;

/// DNS response code for a name that does not exist
pub const NXDOMAIN: u32 = 3;

/// Source of existence answers for domains.
///
/// Abstracted so the verification stage can run against a mock.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExistenceOracle: Send + Sync {
    /// Return the DNS status code for `domain`.
    async fn query(&self, domain: &str) -> Result<u32, BlocklistError>;
}

#[derive(Debug, Deserialize)]
struct DnsJsonResponse {
    #[serde(rename = "Status")]
    status: u32,
}

/// JSON DNS API client (`GET <endpoint>?name=<domain>`).
#[derive(Clone)]
pub struct DohResolver {
    client: Client,
    endpoint: String,
}

impl DohResolver {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ExistenceOracle for DohResolver {
    async fn query(&self, domain: &str) -> Result<u32, BlocklistError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", domain)])
            .header("Accept", "application/dns-json")
            .send()
            .await
            .map_err(|e| BlocklistError::Resolver(format!("request for {} failed: {}", domain, e)))?;

        if response.status() != StatusCode::OK {
            return Err(BlocklistError::Resolver(format!(
                "unexpected status code for {}: {}",
                domain,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BlocklistError::Resolver(format!("reading response for {} failed: {}", domain, e)))?;

        let parsed: DnsJsonResponse = serde_json::from_slice(&body).map_err(|e| {
            BlocklistError::Resolver(format!("unmarshalling response for {} failed: {}", domain, e))
        })?;

        Ok(parsed.status)
    }
}
