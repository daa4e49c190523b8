//! Line classification.
//!
//! Each event kind owns one regex. A line is tested against the kinds in
//! [`EventKind::PRECEDENCE`] order and the first match decides its kind.
//! The built-in table is compiled once on first use; custom tables come from
//! a [`PatternSet`], usually loaded from the `[patterns]` config section.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::EventKind;

/// Built-in classifier table for current monerod logs.
static BUILTIN: Lazy<Patterns> = Lazy::new(|| {
    Patterns::compile(&PatternSet::default()).expect("built-in event patterns are valid")
});

/// Regex sources, one per event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    #[serde(default = "default_block_pattern")]
    pub block: String,
    #[serde(default = "default_connect_pattern")]
    pub connect: String,
    #[serde(default = "default_disconnect_pattern")]
    pub disconnect: String,
    #[serde(default = "default_reason_pattern")]
    pub reason: String,
    #[serde(default = "default_notify_pattern")]
    pub notify: String,
}

pub fn default_block_pattern() -> String {
    "NOTIFY_NEW_FLUFFY_BLOCK".to_string()
}

pub fn default_connect_pattern() -> String {
    "NEW CONNECTION".to_string()
}

pub fn default_disconnect_pattern() -> String {
    "CLOSE CONNECTION".to_string()
}

pub fn default_reason_pattern() -> String {
    "tud.reason".to_string()
}

pub fn default_notify_pattern() -> String {
    "NOTIFY_NEW_TRANSACTIONS".to_string()
}

impl Default for PatternSet {
    fn default() -> Self {
        Self {
            block: default_block_pattern(),
            connect: default_connect_pattern(),
            disconnect: default_disconnect_pattern(),
            reason: default_reason_pattern(),
            notify: default_notify_pattern(),
        }
    }
}

impl PatternSet {
    /// The regex source configured for `kind`.
    pub fn source(&self, kind: EventKind) -> &str {
        match kind {
            EventKind::Block => &self.block,
            EventKind::Connect => &self.connect,
            EventKind::Disconnect => &self.disconnect,
            EventKind::Reason => &self.reason,
            EventKind::Notify => &self.notify,
        }
    }
}

/// A pattern in a [`PatternSet`] failed to compile.
#[derive(Debug, thiserror::Error)]
#[error("Invalid {kind} pattern '{pattern}': {source}")]
pub struct PatternError {
    pub kind: EventKind,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Compiled classifier table, held in precedence order.
#[derive(Debug, Clone)]
pub struct Patterns {
    table: Vec<(EventKind, Regex)>,
}

impl Patterns {
    /// Compile every pattern of `set`.
    ///
    /// # Errors
    ///
    /// Returns the first kind whose pattern is not a valid regex.
    pub fn compile(set: &PatternSet) -> Result<Self, PatternError> {
        let table = EventKind::PRECEDENCE
            .iter()
            .map(|&kind| {
                let pattern = set.source(kind);
                Regex::new(pattern)
                    .map(|regex| (kind, regex))
                    .map_err(|source| PatternError {
                        kind,
                        pattern: pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { table })
    }

    /// The built-in table for current monerod logs.
    pub fn builtin() -> &'static Patterns {
        &BUILTIN
    }

    /// Classify a line. `None` means the line carries no event.
    pub fn classify(&self, line: &str) -> Option<EventKind> {
        self.table
            .iter()
            .find(|(_, regex)| regex.is_match(line))
            .map(|(kind, _)| *kind)
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
