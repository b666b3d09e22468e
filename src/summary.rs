//! Run statistics and count formatting.

use std::fmt;

/// Counters collected over one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Configured sources
    pub sources: usize,
    /// Sources that could not be fetched
    pub failed_sources: usize,
    /// Unique domains after format, TLD and whitelist filtering
    pub candidates: usize,
    /// Domains that survived the existence check
    pub verified: usize,
}

impl RunSummary {
    /// Candidates the resolver reported as non-existent.
    pub fn removed(&self) -> usize {
        self.candidates.saturating_sub(self.verified)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} sources fetched, {} candidates, {} verified ({} non-existent)",
            self.sources - self.failed_sources.min(self.sources),
            self.sources,
            format_count(self.candidates),
            format_count(self.verified),
            format_count(self.removed())
        )
    }
}

/// Format a count with K/M suffix
pub fn format_count(count: usize) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}
