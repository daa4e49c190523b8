//! Per-session connection state.
//!
//! Connect, disconnect and reason lines for one session can arrive in any
//! order. The table keeps one [`PartialConnection`] per
//! (peer, session) key and merges each new line into it; records are only
//! produced once the whole log has been read.

use std::collections::HashMap;

use super::types::{ConnectionRecord, Timestamp};

/// Correlation key for connection lines.
///
/// Lines without a session token share the `session: None` bucket of their
/// peer, so unrelated sessions of that peer can be merged. This mirrors how
/// the logs have always been read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// Bare peer IP.
    pub peer: Option<String>,
    pub session: Option<String>,
}

impl SessionKey {
    pub fn new(peer: Option<String>, session: Option<String>) -> Self {
        Self { peer, session }
    }
}

/// One field update for a session, carrying the new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionField {
    /// A connect line was seen; the value is its timestamp, if any.
    Connect(Option<Timestamp>),
    /// A disconnect line was seen; the value is its timestamp, if any.
    Disconnect(Option<Timestamp>),
    Reason(String),
}

/// Accumulated state of one session.
///
/// `connect` and `disconnect` are `Some` once the matching line has been
/// seen. The inner `Option` is the line's timestamp, which may itself be
/// missing. Slots are overwritten by later lines and never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConnection {
    pub connect: Option<Option<Timestamp>>,
    pub disconnect: Option<Option<Timestamp>>,
    pub reason: Option<String>,
}

impl PartialConnection {
    /// Overwrite the slot named by `field`, leaving the other two untouched.
    pub fn apply(&mut self, field: SessionField) {
        match field {
            SessionField::Connect(ts) => self.connect = Some(ts),
            SessionField::Disconnect(ts) => self.disconnect = Some(ts),
            SessionField::Reason(text) => self.reason = Some(text),
        }
    }

    /// Both the connect and the disconnect line have been seen.
    pub fn is_complete(&self) -> bool {
        self.connect.is_some() && self.disconnect.is_some()
    }

    /// Any connect, disconnect or reason line has been merged in.
    ///
    /// Entries created only by block or notification lines stay untouched.
    pub fn is_touched(&self) -> bool {
        self.connect.is_some() || self.disconnect.is_some() || self.reason.is_some()
    }
}

/// Mapping from [`SessionKey`] to [`PartialConnection`].
///
/// Keys are remembered in first-seen order so that finalized records come
/// out in the order their sessions first appeared in the log.
#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    index: HashMap<SessionKey, usize>,
    entries: Vec<(SessionKey, PartialConnection)>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `key`, inserting an empty one if it is new.
    pub fn get_or_create(&mut self, key: SessionKey) -> &mut PartialConnection {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(key.clone(), slot);
                self.entries.push((key, PartialConnection::default()));
                slot
            }
        };
        &mut self.entries[slot].1
    }

    pub fn get(&self, key: &SessionKey) -> Option<&PartialConnection> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// Overwrite one field of the entry for `key` (last write wins).
    pub fn update(&mut self, key: SessionKey, field: SessionField) {
        self.get_or_create(key).apply(field);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Turn complete sessions into records.
    ///
    /// Returns the records and the number of incomplete sessions that were
    /// dropped. Entries never touched by a connection line are not counted.
    pub fn finalize(self) -> (Vec<ConnectionRecord>, usize) {
        let mut dropped = 0;
        let mut records = Vec::new();

        for (key, partial) in self.entries {
            let touched = partial.is_touched();
            match (partial.connect, partial.disconnect) {
                (Some(connected_at), Some(disconnected_at)) => {
                    records.push(ConnectionRecord {
                        peer: key.peer,
                        connected_at,
                        disconnected_at,
                        reason: partial.reason,
                    });
                }
                _ if touched => dropped += 1,
                _ => {}
            }
        }

        (records, dropped)
    }
}
