//! Field extraction from classified lines.
//!
//! Every extractor searches the raw line and returns `None` when its pattern
//! is absent. A missing field never prevents the others from being read.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{PeerAddress, Timestamp};

/// Fixed-width timestamp, restricted to the 2018-2019 capture window.
static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"201[89]-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}")
        .expect("timestamp pattern is valid")
});

/// Bracket-opened connection context: `[a.b.c.d` with an optional `:port`.
static PEER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})(?::([0-9]{1,5}))?")
        .expect("peer pattern is valid")
});

static SESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("session pattern is valid")
});

static HEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9]{6,9}\b").expect("height pattern is valid"));

/// Separator after the connection context; the reason text follows it.
pub const REASON_DELIMITER: &str = "] ";

/// First timestamp on the line.
pub fn timestamp(line: &str) -> Option<Timestamp> {
    TIMESTAMP.find(line).map(|m| Timestamp::new(m.as_str()))
}

/// First bracketed peer address on the line, without the bracket.
pub fn peer_address(line: &str) -> Option<PeerAddress> {
    let caps = PEER.captures(line)?;
    let ip = caps.get(1)?.as_str();
    let port = caps.get(2).and_then(|m| m.as_str().parse().ok());
    Some(PeerAddress::new(ip, port))
}

/// First GUID-shaped session token on the line.
pub fn session_id(line: &str) -> Option<String> {
    SESSION.find(line).map(|m| m.as_str().to_string())
}

/// Block height announced on a block line.
///
/// Takes the first standalone run of 6 to 9 digits, ignoring digits that are
/// part of the session token.
pub fn block_height(line: &str) -> Option<u64> {
    let session = SESSION.find(line).map(|m| m.range());
    HEIGHT
        .find_iter(line)
        .find(|m| {
            session
                .as_ref()
                .map_or(true, |s| m.start() >= s.end || m.end() <= s.start)
        })
        .and_then(|m| m.as_str().parse().ok())
}

/// Reason text: the segment after the first `"] "` up to the next one.
pub fn reason(line: &str) -> Option<String> {
    let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
    let (_, rest) = line.split_once(REASON_DELIMITER)?;
    let text = rest
        .split_once(REASON_DELIMITER)
        .map_or(rest, |(text, _)| text);
    Some(text.to_string())
}
