//! On-disk lookup cache

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{EnrichError, IpInfo};

/// JSON object mapping IP to [`IpInfo`], bound to a file.
#[derive(Debug, Clone)]
pub struct IpCache {
    path: PathBuf,
    entries: BTreeMap<String, IpInfo>,
}

impl IpCache {
    /// Empty cache that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the cache from `path`. A missing file gives an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, EnrichError> {
        let path = path.into();
        if !path.exists() {
            debug!(path = %path.display(), "no cache file yet");
            return Ok(Self::new(path));
        }

        let contents = fs::read_to_string(&path).map_err(|source| EnrichError::CacheRead {
            path: path.clone(),
            source,
        })?;
        let entries: BTreeMap<String, IpInfo> = if contents.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&contents).map_err(|source| EnrichError::CacheFormat {
                path: path.clone(),
                source,
            })?
        };

        info!(path = %path.display(), entries = entries.len(), "loaded cache");
        Ok(Self { path, entries })
    }

    /// Write the cache back to its file, creating parent directories.
    pub fn save(&self) -> Result<(), EnrichError> {
        let write_err = |source| EnrichError::CacheWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)
            .map_err(|source| EnrichError::CacheFormat {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, contents).map_err(write_err)?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "saved cache");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, ip: &str) -> Option<&IpInfo> {
        self.entries.get(ip)
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.entries.contains_key(ip)
    }

    pub fn insert(&mut self, ip: String, info: IpInfo) {
        self.entries.insert(ip, info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IpInfo)> {
        self.entries.iter()
    }
}
