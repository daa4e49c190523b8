//! Configuration management for peerlog

mod io;
mod types;

pub use types::*;

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logparse::Patterns;

impl Config {
    /// Get the config file path (~/.config/peerlog/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load()
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        io::save(self)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        io::save_to(self, path)
    }

    /// Check the whole configuration, including that all patterns compile
    pub fn validate(&self) -> Result<()> {
        self.compile_patterns()?;
        self.enrich.validate().map_err(|e| anyhow!(e))?;
        Ok(())
    }

    /// Compile the `[patterns]` section into a classifier table
    pub fn compile_patterns(&self) -> Result<Patterns> {
        Ok(Patterns::compile(&self.patterns)?)
    }

    /// Expanded path of the lookup cache
    pub fn cache_file(&self) -> PathBuf {
        expand_path(&self.enrich.cache_file)
    }

    /// Category lists as (label, expanded path), in priority order
    pub fn category_sources(&self) -> Vec<(String, PathBuf)> {
        self.enrich
            .categories
            .iter()
            .map(|source| (source.label.clone(), expand_path(&source.file)))
            .collect()
    }

    /// File of the Tor exit list category, if one is configured
    pub fn tor_list_path(&self) -> Option<PathBuf> {
        self.enrich
            .categories
            .iter()
            .find(|source| source.label.eq_ignore_ascii_case(TOR_LABEL))
            .map(|source| expand_path(&source.file))
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.enrich.timeout_secs)
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
