//! Peer IP enrichment
//!
//! Attaches geolocation and a category label (known node list, Tor exit,
//! ...) to peer addresses. Lookups go through the [`GeoLookup`] trait and
//! are cached on disk so an address is only ever queried once.
//!
//! The public lookup service is rate limited. [`Enricher::enrich`] therefore
//! saves the cache periodically and stops querying on the first failure,
//! returning what it has instead of failing the whole run.

mod cache;
mod categories;
mod lookup;
pub mod tor;

pub use cache::IpCache;
pub use categories::{normalize_ip, read_ip_list, read_ip_list_file, IpCategories};
pub use lookup::{GeoLookup, IpInfoClient};

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default number of new lookups between cache saves.
pub const DEFAULT_CHECKPOINT_EVERY: usize = 25;

/// Information about one IP.
///
/// Only the fields used by the statistics are typed. Everything else the
/// service returns (city, org, timezone, ...) is kept in `extra` so that the
/// cache round-trips without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// `"lat,lon"` as sent by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl IpInfo {
    /// Parsed `loc` as (latitude, longitude).
    pub fn location(&self) -> Option<(f64, f64)> {
        let (lat, lon) = self.loc.as_deref()?.split_once(',')?;
        Some((lat.trim().parse().ok()?, lon.trim().parse().ok()?))
    }

    /// True when both a country and a usable location are present.
    pub fn is_located(&self) -> bool {
        self.country.as_deref().is_some_and(|c| !c.is_empty()) && self.location().is_some()
    }
}

/// Errors raised while enriching addresses.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {target} failed")]
    Http {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {target} returned HTTP {status} (daily request limit reached?)")]
    Status { target: String, status: u16 },

    #[error("Unexpected response from {target}")]
    Decode {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read cache file: {}", path.display())]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache file is not valid JSON: {}", path.display())]
    CacheFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write cache file: {}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of an enrichment run.
#[derive(Debug, Default)]
pub struct EnrichOutcome {
    /// Information for every requested address that is cached now.
    pub infos: BTreeMap<String, IpInfo>,
    /// Number of addresses looked up during this run.
    pub fetched: usize,
    /// Requested entries that were not IPv4 addresses.
    pub invalid: usize,
    /// The lookup failure that stopped querying, if any.
    pub aborted: Option<EnrichError>,
}

impl EnrichOutcome {
    /// Requested addresses that still have no information.
    pub fn missing(&self, requested: usize) -> usize {
        requested.saturating_sub(self.invalid + self.infos.len())
    }
}

/// Looks up addresses through a [`GeoLookup`] and labels them.
pub struct Enricher<L> {
    lookup: L,
    categories: IpCategories,
    checkpoint_every: usize,
}

impl<L: GeoLookup> Enricher<L> {
    pub fn new(lookup: L, categories: IpCategories) -> Self {
        Self {
            lookup,
            categories,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
        }
    }

    /// Save the cache after this many new lookups. `0` only saves at the end.
    pub fn with_checkpoint_every(mut self, every: usize) -> Self {
        self.checkpoint_every = every;
        self
    }

    pub fn categories(&self) -> &IpCategories {
        &self.categories
    }

    /// Enrich `addresses`, querying only those missing from `cache`.
    ///
    /// Categories are assigned from the current lists, including for entries
    /// that were already cached. Lookup failures do not fail the call; they
    /// end up in [`EnrichOutcome::aborted`].
    ///
    /// # Errors
    ///
    /// Only saving the cache can fail.
    pub fn enrich<I, S>(&self, addresses: I, cache: &mut IpCache) -> Result<EnrichOutcome, EnrichError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcome = EnrichOutcome::default();
        let mut unsaved = 0;

        for address in addresses {
            let Some(ip) = normalize_ip(address.as_ref()) else {
                warn!(entry = address.as_ref(), "not an IPv4 address, skipping");
                outcome.invalid += 1;
                continue;
            };

            if !cache.contains(&ip) && outcome.aborted.is_none() {
                match self.lookup.lookup(&ip) {
                    Ok(info) => {
                        debug!(ip = %ip, country = info.country.as_deref().unwrap_or("-"), "looked up");
                        cache.insert(ip.clone(), info);
                        outcome.fetched += 1;
                        unsaved += 1;
                    }
                    Err(err) => {
                        warn!(ip = %ip, error = %err, "lookup failed, no further queries this run");
                        outcome.aborted = Some(err);
                    }
                }

                if self.checkpoint_every > 0 && unsaved >= self.checkpoint_every {
                    cache.save()?;
                    info!(entries = cache.len(), "cache checkpoint");
                    unsaved = 0;
                }
            }

            if let Some(cached) = cache.get(&ip) {
                let mut info = cached.clone();
                info.category = self.categories.category_of(&ip).map(str::to_string);
                outcome.infos.insert(ip, info);
            }
        }

        if unsaved > 0 {
            cache.save()?;
        }

        info!(
            addresses = outcome.infos.len(),
            fetched = outcome.fetched,
            aborted = outcome.aborted.is_some(),
            "enrichment finished"
        );
        Ok(outcome)
    }
}
