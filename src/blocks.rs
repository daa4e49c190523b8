//! Block arrival comparison between nodes
//!
//! Given the block reports of two nodes, compares for every block height
//! both nodes saw when each one first heard of it.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::logparse::BlockRecord;
use crate::stats::DurationSummary;

/// Earliest announcement time per block height.
///
/// Records without a usable timestamp are ignored.
pub fn earliest_arrivals(blocks: &[BlockRecord]) -> BTreeMap<u64, NaiveDateTime> {
    let mut earliest: BTreeMap<u64, NaiveDateTime> = BTreeMap::new();
    for record in blocks {
        let Some(at) = record.timestamp.as_ref().and_then(|t| t.to_datetime()) else {
            debug!(height = record.height, "block record without usable timestamp");
            continue;
        };
        earliest
            .entry(record.height)
            .and_modify(|seen| *seen = (*seen).min(at))
            .or_insert(at);
    }
    earliest
}

/// `first - second` for every height present in both, in height order.
///
/// A negative difference means the first node saw the block earlier.
pub fn arrival_deltas(
    first: &BTreeMap<u64, NaiveDateTime>,
    second: &BTreeMap<u64, NaiveDateTime>,
) -> Vec<(u64, Duration)> {
    first
        .iter()
        .filter_map(|(height, a)| second.get(height).map(|b| (*height, *a - *b)))
        .collect()
}

/// Min, max and mean arrival difference over a comparison.
pub type DeltaSummary = DurationSummary;

/// Summarize the differences returned by [`arrival_deltas`].
pub fn summarize_deltas(deltas: &[(u64, Duration)]) -> Option<DeltaSummary> {
    DurationSummary::from_durations(deltas.iter().map(|(_, delta)| *delta))
}

/// Output file stem for a comparison, `<first>_vs_<second>`.
pub fn comparison_name(first: &str, second: &str) -> String {
    format!("{}_vs_{}", first, second)
}
