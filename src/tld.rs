//! Public suffix classification.
//!
//! The classifier is built once per run from two reference lists (the IANA
//! TLD list and the public suffix list) and is read-only afterwards.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::fetcher::Fetcher;

/// Immutable snapshot of the TLD reference data.
#[derive(Debug, Clone, Default)]
pub struct TldClassifier {
    /// Single-label public TLDs (`com`, `uk`, ...)
    tlds: HashSet<String>,
    /// Multi-label public suffixes, each prefixed with `.` (`.co.uk`)
    suffixes: Vec<String>,
}

impl TldClassifier {
    /// Build a classifier from the raw contents of both reference lists.
    pub fn from_lists(tld_list: &str, effective_tld_names: &str) -> Self {
        let mut classifier = Self::default();
        classifier.add_tld_list(tld_list);
        classifier.add_effective_tld_names(effective_tld_names);
        classifier
    }

    /// Fetch both reference lists concurrently and build the classifier.
    ///
    /// A list that cannot be fetched contributes nothing; the run goes on
    /// with whatever the other list provided.
    pub async fn bootstrap(fetcher: &Fetcher, tld_list_url: &str, effective_tld_url: &str) -> Self {
        info!("Fetching TLD reference data...");

        let (tld_list, effective) = tokio::join!(
            fetcher.fetch_text(tld_list_url),
            fetcher.fetch_text(effective_tld_url)
        );

        let mut classifier = Self::default();
        match tld_list {
            Ok(content) => classifier.add_tld_list(&content),
            Err(e) => warn!("TLD list unavailable: {}", e),
        }
        match effective {
            Ok(content) => classifier.add_effective_tld_names(&content),
            Err(e) => warn!("Effective TLD names unavailable: {}", e),
        }

        info!(
            "Loaded {} TLDs and {} effective TLD suffixes",
            classifier.tld_count(),
            classifier.suffix_count()
        );
        classifier
    }

    /// Add a plain TLD list (one label per line, `#` comments).
    pub fn add_tld_list(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.tlds.insert(line.to_lowercase());
        }
    }

    /// Add public suffix list data.
    ///
    /// Only rules starting with an ASCII letter or digit are used; comments,
    /// wildcard and exception rules are skipped.
    pub fn add_effective_tld_names(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim().to_lowercase();
            let starts_alnum = line
                .as_bytes()
                .first()
                .is_some_and(|c| c.is_ascii_alphanumeric());
            if !starts_alnum {
                continue;
            }
            if line.contains('.') {
                self.suffixes.push(format!(".{}", line));
            } else {
                self.tlds.insert(line);
            }
        }
    }

    /// Whether `domain` ends in a recognized public suffix.
    pub fn matches(&self, domain: &str) -> bool {
        let last_label = domain.rsplit('.').next().unwrap_or(domain);
        if self.tlds.contains(last_label) {
            return true;
        }
        self.suffixes.iter().any(|suffix| domain.ends_with(suffix.as_str()))
    }

    /// Like [`matches`](Self::matches), logging rejected domains.
    pub fn check(&self, domain: &str) -> bool {
        let matched = self.matches(domain);
        if !matched {
            debug!("Doesn't match any TLD: {}", domain);
        }
        matched
    }

    pub fn tld_count(&self) -> usize {
        self.tlds.len()
    }

    pub fn suffix_count(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tlds.is_empty() && self.suffixes.is_empty()
    }
}
