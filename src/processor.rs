//! Turns one blocklist source into a set of candidate domains.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::config::SourceConfig;
use crate::error::BlocklistError;
use crate::fetcher::Fetcher;
use crate::tld::TldClassifier;
use crate::validator::LineValidator;
use crate::whitelist::Whitelist;

/// Read-only classifiers shared by every source task.
#[derive(Clone)]
pub struct DomainFilter {
    tlds: Arc<TldClassifier>,
    whitelist: Arc<Whitelist>,
}

impl DomainFilter {
    pub fn new(tlds: Arc<TldClassifier>, whitelist: Arc<Whitelist>) -> Self {
        Self { tlds, whitelist }
    }

    /// Domain ends in a known public suffix and is not whitelisted.
    pub fn accepts(&self, domain: &str) -> bool {
        self.tlds.check(domain) && !self.whitelist.is_whitelisted(domain)
    }
}

/// Validate and filter every line from `reader`.
///
/// Lines are split on raw `\n` bytes; a line that is not valid UTF-8 is
/// rejected on its own. A read error ends the source early; domains
/// collected up to that point are kept.
pub async fn process_lines<R>(
    mut reader: R,
    validator: &LineValidator,
    filter: &DomainFilter,
) -> HashSet<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut domains = HashSet::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Stopped reading source after I/O error: {}", e);
                break;
            }
        }

        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let Ok(line) = std::str::from_utf8(raw) else {
            debug!("Invalid line (not UTF-8): {}", String::from_utf8_lossy(raw));
            continue;
        };

        let line = line.to_lowercase();
        let Some(domain) = validator.validate(&line) else {
            continue;
        };
        if filter.accepts(&domain) {
            domains.insert(domain);
        }
    }

    domains
}

/// Fetch `source` and return its accepted domains.
///
/// Fetch failures are returned to the caller, which treats the source as
/// contributing no domains.
pub async fn process_source(
    fetcher: &Fetcher,
    source: &SourceConfig,
    filter: &DomainFilter,
) -> Result<HashSet<String>, BlocklistError> {
    info!("Fetching {}...", source.url);

    let reader = fetcher.fetch_lines(&source.url).await?;
    let domains = process_lines(reader, &source.format.validator(), filter).await;

    info!("Fetched {} - {} domains", source.url, domains.len());
    Ok(domains)
}
