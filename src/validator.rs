//! Line validators for blocklist sources.
//!
//! Every source is either a hosts file (`<address> <domain>`) or a plain
//! list with one domain per line. Input is expected to be lower-cased by the
//! caller before validation.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Pattern every accepted domain must match.
pub const DOMAIN_PATTERN: &str = r"^((xn--)?[[:alnum:]][[:alnum:]\-_]*\.)+[[:alnum:]]{2,}$";

static VALID_DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(DOMAIN_PATTERN).expect("domain pattern is a valid regex"));

/// Check whether `domain` is a syntactically valid domain name.
///
/// # Examples
/// ```
/// use domain_blocklist::validator::is_valid_domain;
/// assert!(is_valid_domain("ads.example.com"));
/// assert!(is_valid_domain("xn--bcher-kva.example"));
/// assert!(!is_valid_domain("localhost"));
/// assert!(!is_valid_domain("example.c"));
/// ```
pub fn is_valid_domain(domain: &str) -> bool {
    VALID_DOMAIN.is_match(domain)
}

/// Extracts a domain from one raw source line.
#[derive(Debug, Clone)]
pub enum LineValidator {
    /// Hosts-file line whose address must equal a fixed literal.
    HostLine { address: String, line: Regex },
    /// Bare domain per line.
    DomainList,
}

impl LineValidator {
    /// Validator for hosts-file lines such as `0.0.0.0 ads.example.com`.
    pub fn host_line(address: &str) -> Self {
        let pattern = format!(r"^({})\s+([\w\-.]+)", regex::escape(address));
        // The address is escaped, so the pattern is always well-formed.
        let line = Regex::new(&pattern).expect("escaped host line pattern is a valid regex");
        Self::HostLine {
            address: address.to_string(),
            line,
        }
    }

    /// Validator for plain domain lists.
    pub fn domain_list() -> Self {
        Self::DomainList
    }

    /// Return the domain carried by `line`, or `None` if the line is rejected.
    pub fn validate(&self, line: &str) -> Option<String> {
        match self {
            Self::HostLine { address, line: re } => {
                let Some(caps) = re.captures(line) else {
                    debug!("Invalid line (expected address {}): {}", address, line);
                    return None;
                };
                let domain = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                if is_valid_domain(domain) {
                    Some(domain.to_string())
                } else {
                    debug!("Invalid domain in host line: {}", line);
                    None
                }
            }
            Self::DomainList => {
                if is_valid_domain(line) {
                    Some(line.to_string())
                } else {
                    debug!("Invalid domain: {}", line);
                    None
                }
            }
        }
    }
}
