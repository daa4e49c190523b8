//! Event and record types produced by the log parser.
//!
//! Absence is always modelled with `Option`. The textual placeholders used
//! in CSV output (`N/A`, `-`) live in the `report` module and never appear
//! in these types.

use std::fmt;

use chrono::NaiveDateTime;

/// `chrono` layout matching the fixed-width monerod timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// ============================================================================
// Event Kinds
// ============================================================================

/// The kind of event a log line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// A peer announced a new block (`NOTIFY_NEW_FLUFFY_BLOCK`).
    Block,
    /// A connection to a peer was opened.
    Connect,
    /// A connection to a peer was closed.
    Disconnect,
    /// Annotation explaining why a connection ended.
    Reason,
    /// A peer relayed transactions (`NOTIFY_NEW_TRANSACTIONS`).
    Notify,
}

impl EventKind {
    /// All kinds, in the order they are tested against a line.
    ///
    /// When several patterns match the same line the earliest kind here wins.
    pub const PRECEDENCE: [EventKind; 5] = [
        EventKind::Block,
        EventKind::Connect,
        EventKind::Disconnect,
        EventKind::Reason,
        EventKind::Notify,
    ];

    /// Lowercase name, as used in configuration keys and log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Block => "block",
            EventKind::Connect => "connect",
            EventKind::Disconnect => "disconnect",
            EventKind::Reason => "reason",
            EventKind::Notify => "notify",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Field Types
// ============================================================================

/// A peer endpoint as written in the log: dotted IPv4 with an optional port.
///
/// Only the IP takes part in correlation and output; the port is kept so
/// callers can still tell two connections from the same host apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    ip: String,
    port: Option<u16>,
}

impl PeerAddress {
    pub fn new(ip: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    /// Parse `a.b.c.d` or `a.b.c.d:port`.
    ///
    /// A port that does not fit in `u16` is dropped rather than rejecting
    /// the whole address.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (ip, port) = match text.split_once(':') {
            Some((ip, port)) => (ip, port.parse().ok()),
            None => (text, None),
        };
        if ip.is_empty() {
            return None;
        }
        Some(Self::new(ip, port))
    }

    /// The bare IP, used as the correlation key.
    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.ip, port),
            None => f.write_str(&self.ip),
        }
    }
}

/// A log timestamp, kept verbatim (`YYYY-MM-DD HH:MM:SS.mmm`).
///
/// The format is fixed-width and zero-padded, so ordering the raw text is
/// the same as ordering by time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to a calendar time. Returns `None` for impossible dates.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, TIMESTAMP_FORMAT).ok()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Output Records
// ============================================================================

/// A finished connection: both its open and close lines were seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    /// Bare peer IP, `None` when the lines carried no address.
    pub peer: Option<String>,
    /// Time of the connect line, `None` when that line had no timestamp.
    pub connected_at: Option<Timestamp>,
    /// Time of the disconnect line, `None` when that line had no timestamp.
    pub disconnected_at: Option<Timestamp>,
    /// Close reason, if a reason line was seen for the session.
    pub reason: Option<String>,
}

/// A transaction relay from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub peer: Option<String>,
    pub timestamp: Option<Timestamp>,
}

/// A block announcement from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    pub peer: Option<String>,
    pub timestamp: Option<Timestamp>,
    pub height: u64,
}
