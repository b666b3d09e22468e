//! Hierarchical reduction of a domain set.
//!
//! Blocking `example.com` already blocks `ads.example.com` in every DNS
//! sinkhole consuming these lists, so the optimized lists only keep the
//! top-most blocked domain of each subtree.

use std::collections::HashSet;

/// Proper parent domains of `domain`, nearest first.
///
/// `a.b.example.com` yields `b.example.com`, `example.com`, `com`.
pub fn parent_domains(domain: &str) -> impl Iterator<Item = &str> {
    domain
        .char_indices()
        .filter(|&(_, c)| c == '.')
        .map(move |(i, _)| &domain[i + 1..])
        .filter(|parent| !parent.is_empty())
}

/// Whether some proper parent of `domain` is in `domains`.
pub fn is_covered(domain: &str, domains: &HashSet<String>) -> bool {
    parent_domains(domain).any(|parent| domains.contains(parent))
}

/// Drop every domain whose parent domain is also in the set.
pub fn optimize(domains: &HashSet<String>) -> HashSet<String> {
    domains
        .iter()
        .filter(|domain| !is_covered(domain, domains))
        .cloned()
        .collect()
}
