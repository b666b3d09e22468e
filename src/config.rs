//! Configuration management for domain-blocklist.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::validator::LineValidator;
use crate::whitelist::{self, Whitelist, WhitelistRule};

/// Default ceiling on concurrent existence checks against the resolver
pub const DEFAULT_MAX_CONCURRENT_CHECKS: usize = 50;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Blocklist sources
    pub sources: Vec<SourceConfig>,

    /// TLD reference data locations
    pub tld: TldConfig,

    /// Existence oracle settings
    pub resolver: ResolverConfig,

    /// Retry policy for source and TLD downloads
    #[serde(deserialize_with = "deserialize_fetch_retry")]
    pub fetch_retry: RetryPolicy,

    /// Domains never blocked
    pub whitelist: Vec<WhitelistRule>,

    /// URL shortener domains, excluded from the "without shortlink" lists
    pub shortlinks: Vec<String>,

    /// Output file names
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            tld: TldConfig::default(),
            resolver: ResolverConfig::default(),
            fetch_retry: RetryPolicy::FETCH,
            whitelist: whitelist::default_rules(),
            shortlinks: default_shortlinks(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for source in &self.sources {
            if !is_http_url(&source.url) {
                anyhow::bail!("Source URL must use HTTP or HTTPS: {}", source.url);
            }
            if let LineFormat::Hosts { address } = &source.format {
                if address.trim().is_empty() {
                    anyhow::bail!("Hosts source {} needs a non-empty address", source.url);
                }
            }
        }

        for url in [
            &self.tld.tld_list_url,
            &self.tld.effective_tld_url,
            &self.resolver.endpoint,
        ] {
            if !is_http_url(url) {
                anyhow::bail!("URL must use HTTP or HTTPS: {}", url);
            }
        }

        if self.fetch_retry.attempts == 0 || self.resolver.retry.attempts == 0 {
            anyhow::bail!("Retry attempts must be at least 1");
        }

        if self.resolver.max_concurrent_checks == 0 {
            anyhow::bail!("resolver.max_concurrent_checks must be at least 1");
        }

        // Surfaces invalid regex rules before any network traffic
        self.compile_whitelist()?;

        Ok(())
    }

    /// Compile the configured whitelist rules
    pub fn compile_whitelist(&self) -> Result<Whitelist> {
        Whitelist::new(&self.whitelist).context("Invalid whitelist")
    }

    /// Serialize to YAML (used by the `config` command)
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// One blocklist source and the format of its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    pub format: LineFormat,
}

impl SourceConfig {
    pub fn hosts(url: &str, address: &str) -> Self {
        Self {
            url: url.to_string(),
            format: LineFormat::Hosts {
                address: address.to_string(),
            },
        }
    }

    pub fn domains(url: &str) -> Self {
        Self {
            url: url.to_string(),
            format: LineFormat::Domains,
        }
    }
}

/// Line format of a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum LineFormat {
    /// Hosts file: `<address> <domain>`
    Hosts { address: String },
    /// One domain per line
    Domains,
}

impl LineFormat {
    pub fn validator(&self) -> LineValidator {
        match self {
            LineFormat::Hosts { address } => LineValidator::host_line(address),
            LineFormat::Domains => LineValidator::domain_list(),
        }
    }
}

/// Fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub attempts: u32,
    /// Pause between two attempts
    pub delay_secs: u64,
}

impl RetryPolicy {
    /// Default for source and TLD downloads
    pub const FETCH: Self = Self {
        attempts: 10,
        delay_secs: 5,
    };

    /// Default for existence checks
    pub const RESOLVER: Self = Self {
        attempts: 10,
        delay_secs: 3,
    };

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Retry block as written in YAML; missing fields keep the default of the
/// block it appears in.
#[derive(Deserialize)]
struct PartialRetryPolicy {
    attempts: Option<u32>,
    delay_secs: Option<u64>,
}

impl PartialRetryPolicy {
    fn or(self, base: RetryPolicy) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts.unwrap_or(base.attempts),
            delay_secs: self.delay_secs.unwrap_or(base.delay_secs),
        }
    }
}

fn deserialize_fetch_retry<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RetryPolicy, D::Error> {
    Ok(PartialRetryPolicy::deserialize(deserializer)?.or(RetryPolicy::FETCH))
}

fn deserialize_resolver_retry<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<RetryPolicy, D::Error> {
    Ok(PartialRetryPolicy::deserialize(deserializer)?.or(RetryPolicy::RESOLVER))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TldConfig {
    /// Plain TLD list, one label per line
    pub tld_list_url: String,
    /// Public suffix list
    pub effective_tld_url: String,
}

impl Default for TldConfig {
    fn default() -> Self {
        Self {
            tld_list_url: "http://data.iana.org/TLD/tlds-alpha-by-domain.txt".to_string(),
            effective_tld_url: "https://publicsuffix.org/list/effective_tld_names.dat".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// DNS-over-HTTPS JSON endpoint queried with `?name=<domain>`
    pub endpoint: String,
    /// Retry policy for a single domain
    #[serde(deserialize_with = "deserialize_resolver_retry")]
    pub retry: RetryPolicy,
    /// Maximum number of checks in flight
    pub max_concurrent_checks: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://dns.google.com/resolve".to_string(),
            retry: RetryPolicy::RESOLVER,
            max_concurrent_checks: DEFAULT_MAX_CONCURRENT_CHECKS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub plain: String,
    pub plain_without_shortlinks: String,
    pub optimized: String,
    pub optimized_without_shortlinks: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plain: "toblock.lst".to_string(),
            plain_without_shortlinks: "toblock-without-shorturl.lst".to_string(),
            optimized: "toblock-optimized.lst".to_string(),
            optimized_without_shortlinks: "toblock-without-shorturl-optimized.lst".to_string(),
        }
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::hosts(
            "https://raw.githubusercontent.com/notracking/hosts-blocklists/master/hostnames.txt",
            "0.0.0.0",
        ),
        SourceConfig::hosts("http://dn-mwsl-hosts.qbox.me/hosts", "191.101.231.96"),
        SourceConfig::hosts("https://adaway.org/hosts.txt", "127.0.0.1"),
        SourceConfig::hosts("http://sysctl.org/cameleon/hosts", "127.0.0.1"),
        SourceConfig::hosts("http://www.hostsfile.org/Downloads/hosts.txt", "127.0.0.1"),
        SourceConfig::hosts(
            "https://raw.githubusercontent.com/yous/YousList/master/hosts.txt",
            "0.0.0.0",
        ),
        SourceConfig::domains("https://download.dnscrypt.info/blacklists/domains/mybase.txt"),
        SourceConfig::hosts(
            "https://raw.githubusercontent.com/koala0529/adhost/master/adhosts",
            "127.0.0.1",
        ),
        SourceConfig::domains("http://mirror1.malwaredomains.com/files/justdomains"),
        SourceConfig::domains("http://ransomwaretracker.abuse.ch/downloads/RW_DOMBL.txt"),
        SourceConfig::domains("https://s3.amazonaws.com/lists.disconnect.me/simple_tracking.txt"),
        SourceConfig::hosts(
            "https://raw.githubusercontent.com/azet12/KADhosts/master/KADhosts.txt",
            "0.0.0.0",
        ),
        SourceConfig::hosts(
            "https://raw.githubusercontent.com/lack006/Android-Hosts-L/master/hosts_files/2016_hosts/AD",
            "127.0.0.1",
        ),
        SourceConfig::hosts("https://gitlab.com/ZeroDot1/CoinBlockerLists/raw/master/hosts", "0.0.0.0"),
    ]
}

fn default_shortlinks() -> Vec<String> {
    [
        "db.tt",
        "www.db.tt",
        "j.mp",
        "www.j.mp",
        "bit.ly",
        "www.bit.ly",
        "pix.bit.ly",
        "goo.gl",
        "www.goo.gl",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sources.len(), 14);
        assert_eq!(config.shortlinks.len(), 9);
        assert_eq!(config.whitelist.len(), 23);
        assert_eq!(config.fetch_retry.attempts, 10);
        assert_eq!(config.fetch_retry.delay(), Duration::from_secs(5));
        assert_eq!(config.resolver.retry.attempts, 10);
        assert_eq!(config.resolver.retry.delay(), Duration::from_secs(3));
        assert_eq!(config.resolver.max_concurrent_checks, 50);
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = Config::default();
        let yaml = config.to_yaml().unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.sources, config.sources);
        assert_eq!(parsed.whitelist, config.whitelist);
        assert_eq!(parsed.shortlinks, config.shortlinks);
        assert_eq!(parsed.resolver.endpoint, config.resolver.endpoint);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
sources:
  - url: "https://example.com/hosts"
    format:
      type: hosts
      address: "0.0.0.0"
  - url: "https://example.com/domains.txt"
    format:
      type: domains
shortlinks: []
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(
            config.sources[0],
            SourceConfig::hosts("https://example.com/hosts", "0.0.0.0")
        );
        assert_eq!(config.sources[1].format, LineFormat::Domains);
        assert!(config.shortlinks.is_empty());
        assert_eq!(config.whitelist.len(), 23);
        assert_eq!(config.resolver.max_concurrent_checks, 50);
    }

    #[test]
    fn test_partial_retry_blocks_keep_their_defaults() {
        let yaml = r#"
fetch_retry:
  attempts: 3
resolver:
  retry:
    delay_secs: 1
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.fetch_retry,
            RetryPolicy {
                attempts: 3,
                delay_secs: 5,
            }
        );
        assert_eq!(
            config.resolver.retry,
            RetryPolicy {
                attempts: 10,
                delay_secs: 1,
            }
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_config_validation_rejects_non_http_source() {
        let config = Config {
            sources: vec![SourceConfig::domains("ftp://example.com/list")],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("HTTP"));
    }

    #[test]
    fn test_config_validation_rejects_empty_address() {
        let config = Config {
            sources: vec![SourceConfig::hosts("https://example.com/hosts", " ")],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_zero_attempts() {
        let mut config = Config::default();
        config.resolver.retry.attempts = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Retry attempts"));
    }

    #[test]
    fn test_config_validation_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.resolver.max_concurrent_checks = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_bad_regex() {
        let config = Config {
            whitelist: vec![WhitelistRule::Regex("[unclosed".into())],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("whitelist"));
    }

    #[test]
    fn test_line_format_validator() {
        let hosts = LineFormat::Hosts {
            address: "127.0.0.1".into(),
        };
        assert_eq!(
            hosts.validator().validate("127.0.0.1 ads.example.com"),
            Some("ads.example.com".into())
        );
        assert_eq!(
            LineFormat::Domains.validator().validate("ads.example.com"),
            Some("ads.example.com".into())
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"resolver:\n  endpoint: \"http://127.0.0.1:8053/resolve\"\n  max_concurrent_checks: 8\n",
        )
        .unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.resolver.endpoint, "http://127.0.0.1:8053/resolve");
        assert_eq!(config.resolver.max_concurrent_checks, 8);
        // retry is missing from the file and falls back to the default policy
        assert_eq!(config.resolver.retry.attempts, 10);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/domain-blocklist.yaml");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file"));
    }
}
