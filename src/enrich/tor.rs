//! Tor exit node list maintenance
//!
//! The list file only ever grows: nodes seen in an earlier download stay
//! listed, since old logs may still contain them.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::info;

use super::{read_ip_list, read_ip_list_file, EnrichError};

/// Bulk list of current Tor exit addresses.
pub const DEFAULT_EXIT_LIST_URL: &str = "https://check.torproject.org/torbulkexitlist";

/// Outcome of [`update_exit_list_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitListUpdate {
    /// Addresses in the file after the update.
    pub total: usize,
    /// Addresses that were not in the file before.
    pub added: usize,
}

/// Download the exit list. One address per line.
pub fn fetch_exit_nodes(url: &str, timeout: Duration) -> Result<BTreeSet<String>, EnrichError> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(EnrichError::Client)?;

    let response = client.get(url).send().map_err(|source| EnrichError::Http {
        target: url.to_string(),
        source,
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(EnrichError::Status {
            target: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().map_err(|source| EnrichError::Decode {
        target: url.to_string(),
        source,
    })?;
    Ok(read_ip_list(body.lines()))
}

/// Add `fetched` to `known`. Returns the number of new addresses.
pub fn merge_exit_nodes(known: &mut BTreeSet<String>, fetched: BTreeSet<String>) -> usize {
    let before = known.len();
    known.extend(fetched);
    known.len() - before
}

/// Merge `fetched` into the list file at `path` and write it back.
pub fn update_exit_list_file(path: &Path, fetched: BTreeSet<String>) -> Result<ExitListUpdate> {
    let mut known = if path.exists() {
        read_ip_list_file(path)?
    } else {
        BTreeSet::new()
    };

    let added = merge_exit_nodes(&mut known, fetched);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    let mut buffer = Vec::new();
    crate::report::write_addresses(&mut buffer, &known).context("Failed to render exit list")?;
    std::fs::write(path, buffer).with_context(|| format!("Failed to write exit list: {:?}", path))?;

    info!(path = %path.display(), total = known.len(), added, "exit list updated");
    Ok(ExitListUpdate {
        total: known.len(),
        added,
    })
}
