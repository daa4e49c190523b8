//! Enrich command handler

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use peerlog::enrich::read_ip_list_file;

use super::{enrich_addresses, load_config};

/// Handle the enrich command.
///
/// Prints (or writes) a JSON object mapping each address to its information.
#[cfg(not(tarpaulin_include))]
pub fn handle(
    config_file: Option<&Path>,
    addresses: &Path,
    cache: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_file)?;
    let cache_path = cache.unwrap_or_else(|| config.cache_file());

    let ips = read_ip_list_file(addresses)?;
    let requested = ips.len();
    let infos = enrich_addresses(&config, &ips, &cache_path)?;

    let json = serde_json::to_string_pretty(&infos).context("Failed to serialize results")?;
    match output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
            println!(
                "{} of {} addresses enriched, written to {}",
                infos.len(),
                requested,
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
