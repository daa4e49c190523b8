//! peerlog Library
//!
//! Parses monerod peer-to-peer logs into per-connection records and derives
//! reports, statistics and block arrival comparisons from them.

pub mod blocks;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod logparse;
pub mod report;
pub mod stats;

pub use config::Config;
pub use enrich::{Enricher, GeoLookup, IpCache, IpCategories, IpInfo, IpInfoClient};
pub use logparse::{
    BlockRecord, ConnectionRecord, EventKind, LogParser, NotificationRecord, ParseError, ParsedLog,
    PatternSet, Patterns,
};
pub use report::{NotifyColumns, ReportPaths};
