//! Labelled IP lists (known nodes, Tor exits, ...)

use std::collections::BTreeSet;
use std::fs;
use std::io::{BufRead, BufReader};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::logparse::PeerAddress;

/// Reduce a list entry to its bare IP.
///
/// Accepts `1.2.3.4`, `1.2.3.4:18080` and the trailing-comma form written by
/// the address report. Returns `None` for anything that is not an IPv4
/// address once the decoration is removed.
pub fn normalize_ip(entry: &str) -> Option<String> {
    let peer = PeerAddress::parse(entry.trim().trim_end_matches(','))?;
    peer.ip().parse::<Ipv4Addr>().ok().map(|addr| addr.to_string())
}

/// Collect the valid IPs from list lines.
///
/// Blank lines and the `ip-address,` report header are ignored. Other lines
/// that do not hold an IP are logged and skipped.
pub fn read_ip_list<I, S>(lines: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ips = BTreeSet::new();
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() || line == crate::report::ADDRESSES_HEADER {
            continue;
        }
        match normalize_ip(line) {
            Some(ip) => {
                ips.insert(ip);
            }
            None => warn!(entry = line, "not an IPv4 address, skipping"),
        }
    }
    ips
}

/// Read an IP list file.
pub fn read_ip_list_file(path: &Path) -> Result<BTreeSet<String>> {
    let file = fs::File::open(path).with_context(|| format!("Failed to open IP list: {:?}", path))?;
    let lines = BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read IP list: {:?}", path))?;
    Ok(read_ip_list(lines))
}

/// Ordered set of labelled IP lists.
///
/// An IP listed under several labels belongs to the first one.
#[derive(Debug, Clone, Default)]
pub struct IpCategories {
    lists: Vec<(String, BTreeSet<String>)>,
}

impl IpCategories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a list. Later lists have lower priority.
    pub fn with_list(mut self, label: impl Into<String>, ips: BTreeSet<String>) -> Self {
        self.lists.push((label.into(), ips));
        self
    }

    /// Load lists from `(label, file)` pairs.
    ///
    /// A missing file counts as an empty list.
    pub fn load(sources: &[(String, PathBuf)]) -> Result<Self> {
        let mut categories = Self::new();
        for (label, path) in sources {
            let ips = if path.exists() {
                read_ip_list_file(path)?
            } else {
                warn!(label = %label, path = %path.display(), "IP list not found, treating as empty");
                BTreeSet::new()
            };
            info!(label = %label, count = ips.len(), "loaded IP list");
            categories = categories.with_list(label.clone(), ips);
        }
        Ok(categories)
    }

    /// Label of the first list containing `ip`.
    pub fn category_of(&self, ip: &str) -> Option<&str> {
        self.lists
            .iter()
            .find(|(_, ips)| ips.contains(ip))
            .map(|(label, _)| label.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.lists.iter().map(|(label, _)| label.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
