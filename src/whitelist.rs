//! Whitelist rules exempting domains from blocking.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BlocklistError;

/// One configured whitelist rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "pattern")]
pub enum WhitelistRule {
    /// Domain contains the pattern
    Contains(String),
    /// Domain starts with the pattern
    Prefix(String),
    /// Domain ends with the pattern
    Suffix(String),
    /// Domain equals the pattern
    Equal(String),
    /// Domain matches the regular expression
    Regex(String),
}

#[derive(Debug, Clone)]
enum Matcher {
    Contains(String),
    Prefix(String),
    Suffix(String),
    Equal(String),
    Regex(Regex),
}

impl Matcher {
    fn is_match(&self, domain: &str) -> bool {
        match self {
            Self::Contains(p) => domain.contains(p.as_str()),
            Self::Prefix(p) => domain.starts_with(p.as_str()),
            Self::Suffix(p) => domain.ends_with(p.as_str()),
            Self::Equal(p) => domain == p,
            Self::Regex(re) => re.is_match(domain),
        }
    }
}

/// Compiled, ordered whitelist.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    matchers: Vec<Matcher>,
}

impl Whitelist {
    /// Compile `rules`, failing on the first invalid regular expression.
    pub fn new(rules: &[WhitelistRule]) -> Result<Self, BlocklistError> {
        let matchers = rules
            .iter()
            .map(|rule| {
                Ok(match rule {
                    WhitelistRule::Contains(p) => Matcher::Contains(p.clone()),
                    WhitelistRule::Prefix(p) => Matcher::Prefix(p.clone()),
                    WhitelistRule::Suffix(p) => Matcher::Suffix(p.clone()),
                    WhitelistRule::Equal(p) => Matcher::Equal(p.clone()),
                    WhitelistRule::Regex(p) => Matcher::Regex(Regex::new(p).map_err(|e| {
                        BlocklistError::Config(format!("invalid whitelist regex '{}': {}", p, e))
                    })?),
                })
            })
            .collect::<Result<Vec<_>, BlocklistError>>()?;
        Ok(Self { matchers })
    }

    /// Whether any rule matches `domain`. Rules are tried in order.
    pub fn is_whitelisted(&self, domain: &str) -> bool {
        let hit = self.matchers.iter().any(|m| m.is_match(domain));
        if hit {
            debug!("In whitelist: {}", domain);
        }
        hit
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Built-in whitelist.
pub fn default_rules() -> Vec<WhitelistRule> {
    use WhitelistRule::{Contains, Equal, Suffix};

    vec![
        Contains("google-analytics".into()),
        Suffix("msedge.net".into()),
        Equal("amazonaws.com".into()),
        Equal("mp.weixin.qq.com".into()),
        Equal("url.cn".into()),
        WhitelistRule::Regex(r"^s3[\d\w\-]*.amazonaws.com".into()),
        Suffix("internetdownloadmanager.com".into()),
        Suffix(".alcohol-soft.com".into()),
        Equal("scootersoftware.com".into()),
        WhitelistRule::Regex(r"[^ad]\.mail\.ru".into()),
        WhitelistRule::Regex(r"[^ad]\.daum\.net".into()),
        WhitelistRule::Regex(r"^\w{1,10}\.yandex\.".into()),
        Suffix(".googlevideo.com".into()),
        WhitelistRule::Regex(r"^[^\.]+\.elb\.amazonaws\.com".into()),
        Suffix(".in-addr.arpa".into()),
        Suffix(".url.cn".into()),
        Equal("qq.com".into()),
        Equal("www.qq.com".into()),
        Equal("analytics.163.com".into()),
        Equal("163.com".into()),
        Equal("behance.net".into()),
        Suffix(".verisign.com".into()),
        Contains("mozilla".into()),
    ]
}
