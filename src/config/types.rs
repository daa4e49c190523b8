//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

use crate::enrich::tor::DEFAULT_EXIT_LIST_URL;
use crate::enrich::DEFAULT_CHECKPOINT_EVERY;
use crate::logparse::PatternSet;
use crate::report::NotifyColumns;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub patterns: PatternSet,
    #[serde(default)]
    pub enrich: EnrichConfig,
}

/// Log parsing configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Only consider lines containing this text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Column order of notifications.csv
    #[serde(default)]
    pub notify_columns: NotifyColumns,
}

/// A labelled IP list used to categorize peers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySource {
    pub label: String,
    /// Path to the list, `~/` is expanded
    pub file: String,
}

impl CategorySource {
    pub fn new(label: &str, file: &str) -> Self {
        Self {
            label: label.to_string(),
            file: file.to_string(),
        }
    }
}

/// IP enrichment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// ipinfo.io access token, raises the daily request limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Save the cache after this many new lookups (0 = only at the end)
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
    #[serde(default = "default_tor_exit_list_url")]
    pub tor_exit_list_url: String,
    /// Category lists in priority order
    #[serde(default = "default_categories")]
    pub categories: Vec<CategorySource>,
}

pub fn default_endpoint() -> String {
    "https://ipinfo.io".to_string()
}

pub fn default_cache_file() -> String {
    "~/.cache/peerlog/ipinfo.json".to_string()
}

pub fn default_timeout_secs() -> u64 {
    10
}

pub fn default_checkpoint_every() -> usize {
    DEFAULT_CHECKPOINT_EVERY
}

pub fn default_tor_exit_list_url() -> String {
    DEFAULT_EXIT_LIST_URL.to_string()
}

/// Label of the Tor exit list; `tor-update` writes to this list's file.
pub const TOR_LABEL: &str = "TOR";

pub fn default_categories() -> Vec<CategorySource> {
    vec![
        CategorySource::new("monero", "~/.config/peerlog/moneroip"),
        CategorySource::new(TOR_LABEL, "~/.config/peerlog/torip"),
    ]
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            cache_file: default_cache_file(),
            timeout_secs: default_timeout_secs(),
            checkpoint_every: default_checkpoint_every(),
            tor_exit_list_url: default_tor_exit_list_url(),
            categories: default_categories(),
        }
    }
}

impl EnrichConfig {
    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("[enrich].endpoint must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("[enrich].timeout_secs must be greater than 0".to_string());
        }
        for source in &self.categories {
            if source.label.trim().is_empty() {
                return Err("[[enrich.categories]] entries need a label".to_string());
            }
        }
        Ok(())
    }
}
