//! Unit tests for configuration

use std::fs;

use peerlog::config::{CategorySource, Config, TOR_LABEL};
use peerlog::NotifyColumns;
use tempfile::TempDir;

#[test]
fn default_values() {
    let config = Config::default();
    assert_eq!(config.parse.filter, None);
    assert_eq!(config.parse.notify_columns, NotifyColumns::IpFirst);
    assert_eq!(config.patterns.connect, "NEW CONNECTION");
    assert_eq!(config.enrich.endpoint, "https://ipinfo.io");
    assert_eq!(config.enrich.timeout_secs, 10);
    assert_eq!(config.enrich.checkpoint_every, 25);
    assert_eq!(config.enrich.categories.len(), 2);
    assert_eq!(config.enrich.categories[1].label, TOR_LABEL);
}

#[test]
fn empty_file_gives_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn partial_sections_keep_other_defaults() {
    let toml = r#"
[parse]
notify_columns = "timestamp-first"

[patterns]
connect = "CONNECT-BEP"

[enrich]
token = "abc123"
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.parse.notify_columns, NotifyColumns::TimestampFirst);
    assert_eq!(config.patterns.connect, "CONNECT-BEP");
    assert_eq!(config.patterns.disconnect, "CLOSE CONNECTION");
    assert_eq!(config.enrich.token.as_deref(), Some("abc123"));
    assert_eq!(config.enrich.cache_file, "~/.cache/peerlog/ipinfo.json");
}

#[test]
fn category_list_order_is_kept() {
    let toml = r#"
[[enrich.categories]]
label = "TOR"
file = "/lists/tor"

[[enrich.categories]]
label = "pool"
file = "/lists/pool"
"#;
    let config: Config = toml::from_str(toml).unwrap();
    let sources = config.category_sources();
    assert_eq!(sources[0].0, "TOR");
    assert_eq!(sources[1].0, "pool");
    assert_eq!(
        config.tor_list_path(),
        Some(std::path::PathBuf::from("/lists/tor"))
    );
}

#[test]
fn no_tor_category_means_no_tor_list() {
    let mut config = Config::default();
    config.enrich.categories = vec![CategorySource::new("monero", "/lists/monero")];
    assert_eq!(config.tor_list_path(), None);
}

#[test]
fn load_from_rejects_invalid_pattern() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[patterns]\nblock = \"(unclosed\"\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid block pattern"));
}

#[test]
fn load_from_rejects_zero_timeout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[enrich]\ntimeout_secs = 0\n").unwrap();

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("peerlog").join("config.toml");

    let mut config = Config::default();
    config.parse.filter = Some("18080".to_string());
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}
