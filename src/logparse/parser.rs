//! Single-pass lifecycle aggregation.
//!
//! [`LogParser`] reads a log front to back, classifies each line, extracts
//! its fields and feeds connection lines into a [`SessionTable`]. Block and
//! notify lines go straight to their output lists. When the source is
//! exhausted the table is finalized into [`ConnectionRecord`]s.
//!
//! # Error Handling
//!
//! Individual lines never fail: unknown lines are skipped and missing fields
//! become `None`. Only I/O on the source itself is fatal, and then no partial
//! result is returned.
//!
//! # Example
//!
//! ```
//! use peerlog::LogParser;
//!
//! let log = "\
//! [2019-01-01 00:00:00.000] NEW CONNECTION [1.2.3.4:5555 guid=aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa]
//! [2019-01-01 00:00:10.000] CLOSE CONNECTION [1.2.3.4:5555 guid=aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa]";
//!
//! let parsed = LogParser::new().parse_str(log);
//! assert_eq!(parsed.connections.len(), 1);
//! assert!(parsed.addresses.contains("1.2.3.4"));
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use super::classifier::Patterns;
use super::extractor;
use super::session::{SessionField, SessionKey, SessionTable};
use super::types::{BlockRecord, EventKind, NotificationRecord};
use super::{ParseStats, ParsedLog};

/// The log source could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to open log file: {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {origin} at line {line}")]
    Read {
        origin: String,
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Configured log parser.
///
/// Holds the classifier table and the optional line filter. A parser can be
/// reused; each `parse_*` call starts from empty state.
#[derive(Debug, Clone, Default)]
pub struct LogParser {
    patterns: Patterns,
    filter: Option<String>,
}

impl LogParser {
    /// Parser with the built-in patterns and no filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom classifier table.
    pub fn with_patterns(mut self, patterns: Patterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Only consider lines containing `filter`.
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Parse a log file.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Open`] if the file cannot be opened and
    /// [`ParseError::Read`] if reading fails part way through.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<ParsedLog, ParseError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| ParseError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "parsing log file");
        self.parse_source(BufReader::new(file), &path.display().to_string())
    }

    /// Parse any buffered reader.
    ///
    /// Lines are decoded lossily, so invalid UTF-8 only affects the line it
    /// appears on.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Read`] if the reader fails.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<ParsedLog, ParseError> {
        self.parse_source(reader, "input")
    }

    /// Parse log content held in memory.
    pub fn parse_str(&self, content: &str) -> ParsedLog {
        self.parse_lines(content.lines())
    }

    /// Parse an already materialized sequence of lines.
    pub fn parse_lines<I, S>(&self, lines: I) -> ParsedLog
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut aggregator = Aggregator::new(&self.patterns, self.filter.as_deref());
        for line in lines {
            aggregator.feed(line.as_ref());
        }
        aggregator.finish()
    }

    fn parse_source<R: BufRead>(
        &self,
        mut reader: R,
        origin: &str,
    ) -> Result<ParsedLog, ParseError> {
        let mut aggregator = Aggregator::new(&self.patterns, self.filter.as_deref());
        let mut buf = Vec::new();
        let mut line_num = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| ParseError::Read {
                    origin: origin.to_string(),
                    line: line_num + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_num += 1;

            let line = String::from_utf8_lossy(&buf);
            aggregator.feed(line.trim_end_matches(|c| c == '\n' || c == '\r'));
        }

        Ok(aggregator.finish())
    }
}

/// Mutable state of one parse.
struct Aggregator<'a> {
    patterns: &'a Patterns,
    filter: Option<&'a str>,
    addresses: BTreeSet<String>,
    table: SessionTable,
    notifications: Vec<NotificationRecord>,
    blocks: Vec<BlockRecord>,
    stats: ParseStats,
}

impl<'a> Aggregator<'a> {
    fn new(patterns: &'a Patterns, filter: Option<&'a str>) -> Self {
        Self {
            patterns,
            filter,
            addresses: BTreeSet::new(),
            table: SessionTable::new(),
            notifications: Vec::new(),
            blocks: Vec::new(),
            stats: ParseStats::default(),
        }
    }

    fn feed(&mut self, line: &str) {
        self.stats.lines_read += 1;

        if let Some(filter) = self.filter {
            if !line.contains(filter) {
                self.stats.lines_filtered += 1;
                return;
            }
        }

        let Some(kind) = self.patterns.classify(line) else {
            trace!(line, "no event");
            self.stats.lines_unclassified += 1;
            return;
        };

        let timestamp = extractor::timestamp(line);
        let peer = extractor::peer_address(line).map(|p| p.ip().to_string());
        if let Some(ip) = &peer {
            self.addresses.insert(ip.clone());
        }

        let session = extractor::session_id(line);
        debug!(
            %kind,
            peer = peer.as_deref().unwrap_or("-"),
            session = session.as_deref().unwrap_or("-"),
            "event"
        );

        let key = SessionKey::new(peer.clone(), session);
        let entry = self.table.get_or_create(key);

        match kind {
            EventKind::Block => match extractor::block_height(line) {
                Some(height) => self.blocks.push(BlockRecord {
                    peer,
                    timestamp,
                    height,
                }),
                None => {
                    warn!(line, "block announcement without a height, skipping");
                    self.stats.blocks_without_height += 1;
                    return;
                }
            },
            EventKind::Connect => entry.apply(SessionField::Connect(timestamp)),
            EventKind::Disconnect => entry.apply(SessionField::Disconnect(timestamp)),
            EventKind::Reason => match extractor::reason(line) {
                Some(text) => entry.apply(SessionField::Reason(text)),
                None => {
                    debug!(line, "reason line without text");
                    self.stats.reasons_without_text += 1;
                }
            },
            EventKind::Notify => self.notifications.push(NotificationRecord { peer, timestamp }),
        }

        self.stats.record(kind);
    }

    fn finish(self) -> ParsedLog {
        let mut stats = self.stats;
        stats.sessions = self.table.len();
        let (connections, dropped) = self.table.finalize();
        stats.incomplete_sessions = dropped;

        info!(
            lines = stats.lines_read,
            addresses = self.addresses.len(),
            connections = connections.len(),
            notifications = self.notifications.len(),
            blocks = self.blocks.len(),
            incomplete_sessions = dropped,
            "log parsed"
        );

        ParsedLog {
            addresses: self.addresses,
            connections,
            notifications: self.notifications,
            blocks: self.blocks,
            stats,
        }
    }
}
