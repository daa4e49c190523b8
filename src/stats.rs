//! Aggregate statistics over parsed logs
//!
//! All functions work on the parser's output records and, where categories
//! or origins are involved, on the enrichment results keyed by bare IP.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::enrich::IpInfo;
use crate::logparse::{ConnectionRecord, NotificationRecord};
use crate::report::NOT_AVAILABLE;

/// Label for peers that are in none of the category lists.
pub const UNCATEGORIZED: &str = "uncategorized";

fn peer_key(peer: Option<&str>) -> String {
    peer.unwrap_or(NOT_AVAILABLE).to_string()
}

/// Number of connections per peer category.
pub fn connection_types(
    connections: &[ConnectionRecord],
    infos: &BTreeMap<String, IpInfo>,
) -> BTreeMap<String, usize> {
    let mut types = BTreeMap::new();
    for record in connections {
        let label = record
            .peer
            .as_deref()
            .and_then(|ip| infos.get(ip))
            .and_then(|info| info.category.as_deref())
            .unwrap_or(UNCATEGORIZED);
        *types.entry(label.to_string()).or_insert(0) += 1;
    }
    types
}

/// Connection length per peer, in log order.
///
/// Connections whose timestamps are missing or unparseable are left out.
pub fn connection_durations(connections: &[ConnectionRecord]) -> BTreeMap<String, Vec<Duration>> {
    let mut durations: BTreeMap<String, Vec<Duration>> = BTreeMap::new();
    for record in connections {
        let connected = record.connected_at.as_ref().and_then(|t| t.to_datetime());
        let disconnected = record.disconnected_at.as_ref().and_then(|t| t.to_datetime());
        match (connected, disconnected) {
            (Some(start), Some(end)) => durations
                .entry(peer_key(record.peer.as_deref()))
                .or_default()
                .push(end - start),
            _ => debug!(
                peer = record.peer.as_deref().unwrap_or(NOT_AVAILABLE),
                "connection without usable timestamps"
            ),
        }
    }
    durations
}

/// Min, max and mean of a set of durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationSummary {
    pub count: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
}

impl DurationSummary {
    /// `None` for an empty input.
    pub fn from_durations<I>(durations: I) -> Option<Self>
    where
        I: IntoIterator<Item = Duration>,
    {
        let mut iter = durations.into_iter();
        let first = iter.next()?;
        let (mut min, mut max, mut total, mut count) = (first, first, first, 1i32);

        for duration in iter {
            min = min.min(duration);
            max = max.max(duration);
            total = total + duration;
            count += 1;
        }

        Some(Self {
            count: count as usize,
            min,
            max,
            mean: total / count,
        })
    }
}

/// Number of transaction notifications per peer.
pub fn notifications_per_peer(notifications: &[NotificationRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in notifications {
        *counts.entry(peer_key(record.peer.as_deref())).or_insert(0) += 1;
    }
    counts
}

/// Number of open connections over time.
///
/// One step per connect (+1) and disconnect (-1) with a usable timestamp,
/// in time order. Events at the same instant keep their record order.
pub fn connection_timeline(connections: &[ConnectionRecord]) -> Vec<(NaiveDateTime, i64)> {
    let mut events = Vec::with_capacity(connections.len() * 2);
    for record in connections {
        if let Some(at) = record.connected_at.as_ref().and_then(|t| t.to_datetime()) {
            events.push((at, 1i64));
        }
        if let Some(at) = record.disconnected_at.as_ref().and_then(|t| t.to_datetime()) {
            events.push((at, -1i64));
        }
    }
    events.sort_by_key(|(at, _)| *at);

    let mut open = 0;
    events
        .into_iter()
        .map(|(at, delta)| {
            open += delta;
            (at, open)
        })
        .collect()
}

/// Uncategorized, located peers per country code.
pub fn origins_by_country(
    addresses: &BTreeSet<String>,
    infos: &BTreeMap<String, IpInfo>,
) -> BTreeMap<String, usize> {
    let mut origins = BTreeMap::new();
    for address in addresses {
        let Some(info) = infos.get(address) else {
            continue;
        };
        if info.category.is_some() || !info.is_located() {
            continue;
        }
        if let Some(country) = &info.country {
            *origins.entry(country.clone()).or_insert(0) += 1;
        }
    }
    origins
}

/// Render a duration as seconds with millisecond precision.
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.3}s", duration.num_milliseconds() as f64 / 1000.0)
}
