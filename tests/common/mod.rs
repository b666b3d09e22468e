//! Shared wiremock fixtures: TLD lists, two sources and a DoH endpoint.

use domain_blocklist::config::{Config, RetryPolicy, SourceConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const HOSTS_SOURCE: &str = "# Test hosts file\n\
127.0.0.1 localhost\n\
0.0.0.0 ads.example.com\n\
0.0.0.0 pixel.ads.example.com\n\
0.0.0.0 gone.example.net\n\
0.0.0.0 tracker.example.co.uk\n\
0.0.0.0 bad.example.zz\n\
0.0.0.0 r1.googlevideo.com\n\
0.0.0.0 goo.gl\n";

pub const DOMAIN_SOURCE: &str = "# Test domain list\n\
metrics.example.org\n\
ads.example.com\n\
not a domain\n";

/// Domains the fixture resolver reports as NXDOMAIN
pub const NONEXISTENT: &[&str] = &["gone.example.net"];

pub async fn start_fixture_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(path("/tlds-alpha-by-domain.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("# Version 2024010100\nCOM\nNET\nORG\nGL\n"),
        )
        .mount(&server)
        .await;
    Mock::given(path("/effective_tld_names.dat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("// ===BEGIN ICANN DOMAINS===\nco.uk\n"))
        .mount(&server)
        .await;
    Mock::given(path("/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOSTS_SOURCE))
        .mount(&server)
        .await;
    Mock::given(path("/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DOMAIN_SOURCE))
        .mount(&server)
        .await;

    for domain in NONEXISTENT {
        Mock::given(method("GET"))
            .and(path("/resolve"))
            .and(query_param("name", *domain))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Status":3}"#))
            .with_priority(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/resolve"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Status":0}"#))
        .mount(&server)
        .await;

    server
}

/// Configuration pointing every URL at the fixture server, without retry delays.
pub fn fixture_config(uri: &str) -> Config {
    let no_delay = RetryPolicy {
        attempts: 2,
        delay_secs: 0,
    };

    let mut config = Config {
        sources: vec![
            SourceConfig::hosts(&format!("{}/hosts", uri), "0.0.0.0"),
            SourceConfig::domains(&format!("{}/domains", uri)),
        ],
        fetch_retry: no_delay,
        shortlinks: vec!["goo.gl".to_string(), "bit.ly".to_string()],
        ..Default::default()
    };
    config.tld.tld_list_url = format!("{}/tlds-alpha-by-domain.txt", uri);
    config.tld.effective_tld_url = format!("{}/effective_tld_names.dat", uri);
    config.resolver.endpoint = format!("{}/resolve", uri);
    config.resolver.retry = no_delay;
    config
}
