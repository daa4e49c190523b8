//! CSV reports for parsed logs
//!
//! The format is the one the analysis scripts have always consumed: a header
//! line, then one row per record with every value followed by a comma.
//! Values are written verbatim without quoting.
//!
//! Missing values are written as placeholders:
//! - [`NOT_AVAILABLE`] for a missing peer or timestamp
//! - [`NO_REASON`] for a connection that closed without a reason line
//!
//! The readers turn both placeholders back into `None`.

mod reader;
mod writer;

pub use reader::{
    read_addresses, read_addresses_file, read_blocks, read_blocks_file, read_connections,
    read_connections_file, read_notifications, read_notifications_file, read_report,
};
pub use writer::{
    write_addresses, write_block_deltas, write_block_deltas_file, write_blocks, write_connections,
    write_notifications, write_report,
};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Placeholder for a peer or timestamp that was not on the line.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a connection without a close reason.
pub const NO_REASON: &str = "-";

pub const ADDRESSES_HEADER: &str = "ip-address,";
pub const CONNECTIONS_HEADER: &str =
    "ip-address,connection-timestamp,disconnection-timestamp,reason,";
pub const BLOCKS_HEADER: &str = "ip-address,timestamp,block-height,";
pub const BLOCK_DELTAS_HEADER: &str = "block-height,difference,";

/// Column order of the notifications report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NotifyColumns {
    /// `ip-address,timestamp,`
    #[default]
    IpFirst,
    /// `timestamp,ip-address,` (layout of older reports)
    TimestampFirst,
}

impl NotifyColumns {
    pub fn header(&self) -> &'static str {
        match self {
            NotifyColumns::IpFirst => "ip-address,timestamp,",
            NotifyColumns::TimestampFirst => "timestamp,ip-address,",
        }
    }
}

/// Output locations for the four reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub addresses: PathBuf,
    pub connections: PathBuf,
    pub notifications: PathBuf,
    pub blocks: PathBuf,
}

impl ReportPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            addresses: dir.join("addresses.csv"),
            connections: dir.join("connections.csv"),
            notifications: dir.join("notifications.csv"),
            blocks: dir.join("blocks.csv"),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            &self.addresses,
            &self.connections,
            &self.notifications,
            &self.blocks,
        ]
    }
}
