//! Command handlers for the peerlog CLI.
//!
//! Each submodule handles one CLI command or command group.
//! The main dispatch logic remains in main.rs.

pub mod compare;
pub mod completions;
pub mod config;
pub mod enrich;
pub mod parse;
pub mod stats;
pub mod tor;

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use peerlog::{Config, Enricher, IpCache, IpCategories, IpInfo, IpInfoClient, LogParser};

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Parser for the configured patterns. A CLI filter replaces the configured one.
pub fn build_parser(config: &Config, filter: Option<String>) -> Result<LogParser> {
    let patterns = config.compile_patterns()?;
    let filter = filter.or_else(|| config.parse.filter.clone());
    Ok(LogParser::new().with_patterns(patterns).with_filter(filter))
}

/// Enricher using the configured lookup service and category lists.
pub fn build_enricher(config: &Config) -> Result<Enricher<IpInfoClient>> {
    let client = IpInfoClient::new(
        config.enrich.endpoint.clone(),
        config.enrich.token.clone(),
        config.lookup_timeout(),
    )?;
    let categories = IpCategories::load(&config.category_sources())?;
    Ok(Enricher::new(client, categories).with_checkpoint_every(config.enrich.checkpoint_every))
}

/// Enrich `addresses`, reporting a stopped run on stderr.
pub fn enrich_addresses<I, S>(
    config: &Config,
    addresses: I,
    cache_path: &Path,
) -> Result<BTreeMap<String, IpInfo>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let addresses: Vec<S> = addresses.into_iter().collect();
    let enricher = build_enricher(config)?;
    let mut cache = IpCache::load(cache_path)?;
    let mut outcome = enricher
        .enrich(&addresses, &mut cache)
        .with_context(|| format!("Failed to enrich addresses using cache {:?}", cache_path))?;

    if let Some(err) = outcome.aborted.take() {
        eprintln!(
            "Lookup stopped after {} new addresses, {} left without data: {:#}",
            outcome.fetched,
            outcome.missing(addresses.len()),
            anyhow::Error::from(err)
        );
    }
    Ok(outcome.infos)
}
