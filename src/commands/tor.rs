//! Tor exit list command handler

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use peerlog::enrich::tor::{fetch_exit_nodes, update_exit_list_file};

use super::load_config;

/// Handle the tor-update command.
#[cfg(not(tarpaulin_include))]
pub fn handle(config_file: Option<&Path>, file: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_file)?;
    let path = file
        .or_else(|| config.tor_list_path())
        .context("No Tor list configured; pass --file or add a TOR entry to [[enrich.categories]]")?;

    let fetched = fetch_exit_nodes(&config.enrich.tor_exit_list_url, config.lookup_timeout())?;
    let update = update_exit_list_file(&path, fetched)?;

    println!(
        "Tor exit nodes: {} ({} new), saved to {}",
        update.total,
        update.added,
        path.display()
    );
    Ok(())
}
