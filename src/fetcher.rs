//! HTTP fetcher for downloading blocklist sources and TLD reference data.

use anyhow::{Context, Result};
use futures::TryStreamExt;
use reqwest::{Client, Response};
use std::pin::Pin;
use std::time::Duration;
use tokio::io::{AsyncBufRead, BufReader};
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::config::RetryPolicy;
use crate::error::BlocklistError;

const TIMEOUT_SECS: u64 = 60;

/// Line-oriented reader over a response body.
pub type LineReader = Pin<Box<dyn AsyncBufRead + Send>>;

/// HTTP client with a fixed-delay retry policy.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Create a fetcher with the default HTTP client settings
    pub fn new(retry: RetryPolicy) -> Result<Self> {
        Ok(Self::with_client(build_client()?, retry))
    }

    /// Create a fetcher around an existing client
    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Fetch `url`, retrying transport failures and non-2xx answers.
    ///
    /// Attempts are separated by the fixed policy delay; there is no backoff.
    pub async fn fetch(&self, url: &str) -> Result<Response, BlocklistError> {
        let attempts = self.retry.attempts.max(1);
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=attempts {
            if attempt > 1 {
                debug!("Retry {} for {} in {:?}", attempt - 1, url, self.retry.delay());
                tokio::time::sleep(self.retry.delay()).await;
            }

            match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => last_error = format!("HTTP {}", response.status()),
                Err(e) => last_error = e.to_string(),
            }
            debug!(
                "Attempt {}/{} for {} failed: {}",
                attempt, attempts, url, last_error
            );
        }

        Err(BlocklistError::Fetch {
            url: url.to_string(),
            attempts,
            reason: last_error,
        })
    }

    /// Fetch `url` and return its body as a buffered line reader.
    pub async fn fetch_lines(&self, url: &str) -> Result<LineReader, BlocklistError> {
        let response = self.fetch(url).await?;
        let stream = response.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::pin(BufReader::new(StreamReader::new(stream))))
    }

    /// Fetch `url` and read the whole body as text.
    pub async fn fetch_text(&self, url: &str) -> Result<String, BlocklistError> {
        let response = self.fetch(url).await?;
        response.text().await.map_err(|e| BlocklistError::Fetch {
            url: url.to_string(),
            attempts: 1,
            reason: format!("failed to read body: {}", e),
        })
    }
}

/// Shared HTTP client used for sources, TLD data and the resolver.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .user_agent(format!("domain-blocklist/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay_secs: 0,
        }
    }

    #[tokio::test]
    async fn test_fetch_text_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hosts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0.0.0.0 ads.example.com\n"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(fast_retry(10)).unwrap();
        let body = fetcher
            .fetch_text(&format!("{}/hosts", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "0.0.0.0 ads.example.com\n");
    }

    #[tokio::test]
    async fn test_fetch_gives_up_after_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(4)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(fast_retry(4)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/down", server.uri()))
            .await
            .unwrap_err();
        match err {
            BlocklistError::Fetch {
                attempts, reason, ..
            } => {
                assert_eq!(attempts, 4);
                assert!(reason.contains("503"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_recovers_after_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(fast_retry(10)).unwrap();
        let body = fetcher.fetch_text(&server.uri()).await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_fetch_lines_streams_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a.com\nb.com\n\nc.com"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(fast_retry(1)).unwrap();
        let reader = fetcher.fetch_lines(&server.uri()).await.unwrap();
        let mut lines = reader.lines();
        let mut collected = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            collected.push(line);
        }
        assert_eq!(collected, vec!["a.com", "b.com", "", "c.com"]);
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let fetcher = Fetcher::new(fast_retry(2)).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:1/unreachable").await;
        assert!(matches!(
            result,
            Err(BlocklistError::Fetch { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let fetcher = Fetcher::new(fast_retry(0)).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:1/unreachable").await;
        assert!(matches!(
            result,
            Err(BlocklistError::Fetch { attempts: 1, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_fixed_delay() {
        // no client timeout, so the retry pause is the only timer
        let fetcher = Fetcher::with_client(
            Client::new(),
            RetryPolicy {
                attempts: 3,
                delay_secs: 5,
            },
        );

        let start = tokio::time::Instant::now();
        let result = fetcher.fetch("http://127.0.0.1:1/unreachable").await;
        assert!(matches!(
            result,
            Err(BlocklistError::Fetch { attempts: 3, .. })
        ));
        // two pauses between three attempts, none after the last one
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(15));
    }
}
