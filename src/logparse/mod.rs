//! monerod log parser and connection-lifecycle aggregator
//!
//! Turns a peer-to-peer node log into four collections: the set of peer
//! addresses, finished connections, transaction notifications and block
//! announcements.
//!
//! # Structure
//!
//! - `classifier` - decides which event kind a line is
//! - `extractor` - pulls timestamp, peer, session, height and reason out of a line
//! - `session` - per (peer, session) state for connection lines
//! - `parser` - the single pass tying the above together

pub mod classifier;
pub mod extractor;
pub mod parser;
pub mod session;
mod types;

pub use classifier::{PatternError, PatternSet, Patterns};
pub use parser::{LogParser, ParseError};
pub use session::{PartialConnection, SessionField, SessionKey, SessionTable};
pub use types::*;

use std::collections::{BTreeMap, BTreeSet};

/// Result of one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLog {
    /// Distinct bare peer IPs seen on any event line.
    pub addresses: BTreeSet<String>,
    /// Sessions for which both a connect and a disconnect line were seen.
    pub connections: Vec<ConnectionRecord>,
    /// Transaction notifications, in log order.
    pub notifications: Vec<NotificationRecord>,
    /// Block announcements, in log order.
    pub blocks: Vec<BlockRecord>,
    pub stats: ParseStats,
}

impl ParsedLog {
    /// True when the log produced no output at all.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
            && self.connections.is_empty()
            && self.notifications.is_empty()
            && self.blocks.is_empty()
    }

    /// One-line summary for display.
    pub fn summary(&self) -> String {
        format!(
            "{} addresses, {} connections, {} notifications, {} blocks ({} lines read)",
            self.addresses.len(),
            self.connections.len(),
            self.notifications.len(),
            self.blocks.len(),
            self.stats.lines_read
        )
    }
}

/// Counters collected during a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines_read: usize,
    /// Lines skipped because they did not contain the filter text.
    pub lines_filtered: usize,
    /// Lines that matched no event pattern.
    pub lines_unclassified: usize,
    /// Accepted events per kind.
    pub events: BTreeMap<EventKind, usize>,
    /// Block lines dropped because no height could be found.
    pub blocks_without_height: usize,
    /// Reason lines that had no text after the context delimiter.
    pub reasons_without_text: usize,
    /// Distinct (peer, session) keys seen.
    pub sessions: usize,
    /// Sessions with connection lines dropped at the end because a connect or
    /// disconnect was missing. Keys seen only on block or notification lines
    /// are not counted.
    pub incomplete_sessions: usize,
}

impl ParseStats {
    pub fn record(&mut self, kind: EventKind) {
        *self.events.entry(kind).or_insert(0) += 1;
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.get(&kind).copied().unwrap_or(0)
    }
}
