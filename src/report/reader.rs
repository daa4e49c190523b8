//! Readers for previously written reports
//!
//! Each reader accepts the layout its writer produces. The header line is
//! optional and blank lines are skipped. `N/A` and `-` placeholders come back
//! as `None`.

use std::collections::BTreeSet;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use super::{
    NotifyColumns, ReportPaths, ADDRESSES_HEADER, BLOCKS_HEADER, CONNECTIONS_HEADER,
    NOT_AVAILABLE, NO_REASON,
};
use crate::logparse::{BlockRecord, ConnectionRecord, NotificationRecord, ParsedLog, Timestamp};

/// Data rows of a report, plus which of the accepted headers it started with.
struct Rows {
    header: Option<usize>,
    lines: Vec<(usize, String)>,
}

fn read_rows<R: BufRead>(reader: R, headers: &[&str]) -> Result<Rows> {
    let mut rows = Rows {
        header: None,
        lines: Vec::new(),
    };

    for (index, line) in reader.lines().enumerate() {
        let line_num = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_num))?;
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            continue;
        }
        if line_num == 1 {
            if let Some(header) = headers.iter().position(|h| line.starts_with(*h)) {
                rows.header = Some(header);
                continue;
            }
        }
        rows.lines.push((line_num, line.to_string()));
    }

    Ok(rows)
}

fn field(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value == NOT_AVAILABLE {
        None
    } else {
        Some(value)
    }
}

fn open(path: &Path, what: &str) -> Result<BufReader<fs::File>> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open {} report: {:?}", what, path))?;
    Ok(BufReader::new(file))
}

/// Read an addresses report (`ip-address,`).
pub fn read_addresses<R: BufRead>(reader: R) -> Result<BTreeSet<String>> {
    let rows = read_rows(reader, &[ADDRESSES_HEADER])?;
    Ok(rows
        .lines
        .iter()
        .filter_map(|(_, line)| line.split(',').next().and_then(field))
        .map(str::to_string)
        .collect())
}

/// Read a connections report.
///
/// The reason is everything after the third column, so reasons containing
/// commas survive the trip.
pub fn read_connections<R: BufRead>(reader: R) -> Result<Vec<ConnectionRecord>> {
    let rows = read_rows(reader, &[CONNECTIONS_HEADER])?;
    let mut connections = Vec::with_capacity(rows.lines.len());

    for (line_num, line) in &rows.lines {
        let mut columns = line.splitn(4, ',');
        let peer = columns.next().and_then(field).map(str::to_string);
        let connected_at = columns.next().and_then(field).map(Timestamp::new);
        let disconnected_at = columns.next().and_then(field).map(Timestamp::new);
        let Some(rest) = columns.next() else {
            bail!("Missing reason column on line {}", line_num);
        };
        let reason = rest.strip_suffix(',').unwrap_or(rest);
        let reason = (!reason.is_empty() && reason != NO_REASON).then(|| reason.to_string());

        connections.push(ConnectionRecord {
            peer,
            connected_at,
            disconnected_at,
            reason,
        });
    }

    Ok(connections)
}

/// Read a notifications report in either column order.
///
/// The header decides the order. Without one, a first column holding a
/// timestamp (it contains a space, an IP never does) means timestamp-first.
pub fn read_notifications<R: BufRead>(reader: R) -> Result<Vec<NotificationRecord>> {
    let headers = [
        NotifyColumns::IpFirst.header(),
        NotifyColumns::TimestampFirst.header(),
    ];
    let rows = read_rows(reader, &headers)?;
    let columns = match rows.header {
        Some(1) => NotifyColumns::TimestampFirst,
        Some(_) => NotifyColumns::IpFirst,
        None => match rows.lines.first() {
            Some((_, line)) if line.split(',').next().is_some_and(|c| c.contains(' ')) => {
                NotifyColumns::TimestampFirst
            }
            _ => NotifyColumns::IpFirst,
        },
    };

    let mut notifications = Vec::with_capacity(rows.lines.len());
    for (line_num, line) in &rows.lines {
        let mut values = line.split(',');
        let (Some(first), Some(second)) = (values.next(), values.next()) else {
            bail!("Expected two columns on line {}", line_num);
        };
        let (peer, timestamp) = match columns {
            NotifyColumns::IpFirst => (first, second),
            NotifyColumns::TimestampFirst => (second, first),
        };
        notifications.push(NotificationRecord {
            peer: field(peer).map(str::to_string),
            timestamp: field(timestamp).map(Timestamp::new),
        });
    }

    Ok(notifications)
}

/// Read a blocks report (`ip-address,timestamp,block-height,`).
pub fn read_blocks<R: BufRead>(reader: R) -> Result<Vec<BlockRecord>> {
    let rows = read_rows(reader, &[BLOCKS_HEADER])?;
    let mut blocks = Vec::with_capacity(rows.lines.len());

    for (line_num, line) in &rows.lines {
        let mut columns = line.split(',');
        let peer = columns.next().and_then(field).map(str::to_string);
        let timestamp = columns.next().and_then(field).map(Timestamp::new);
        let height = match columns.next().and_then(field) {
            Some(height) => height
                .parse::<u64>()
                .with_context(|| format!("Invalid block height '{}' on line {}", height, line_num))?,
            None => bail!("Missing block height on line {}", line_num),
        };

        blocks.push(BlockRecord {
            peer,
            timestamp,
            height,
        });
    }

    Ok(blocks)
}

pub fn read_addresses_file(path: &Path) -> Result<BTreeSet<String>> {
    read_addresses(open(path, "address")?)
        .with_context(|| format!("Invalid address report: {:?}", path))
}

pub fn read_connections_file(path: &Path) -> Result<Vec<ConnectionRecord>> {
    read_connections(open(path, "connection")?)
        .with_context(|| format!("Invalid connection report: {:?}", path))
}

pub fn read_notifications_file(path: &Path) -> Result<Vec<NotificationRecord>> {
    read_notifications(open(path, "notification")?)
        .with_context(|| format!("Invalid notification report: {:?}", path))
}

/// Read a blocks report from disk.
pub fn read_blocks_file(path: &Path) -> Result<Vec<BlockRecord>> {
    read_blocks(open(path, "block")?).with_context(|| format!("Invalid block report: {:?}", path))
}

/// Load a report set written by [`write_report`](super::write_report).
///
/// The blocks report is optional; the other three must exist. Parse
/// counters stay at zero since no log was read.
pub fn read_report(paths: &ReportPaths) -> Result<ParsedLog> {
    let blocks = if paths.blocks.exists() {
        read_blocks_file(&paths.blocks)?
    } else {
        Vec::new()
    };

    let parsed = ParsedLog {
        addresses: read_addresses_file(&paths.addresses)?,
        connections: read_connections_file(&paths.connections)?,
        notifications: read_notifications_file(&paths.notifications)?,
        blocks,
        stats: Default::default(),
    };
    info!(
        addresses = parsed.addresses.len(),
        connections = parsed.connections.len(),
        notifications = parsed.notifications.len(),
        "reports loaded"
    );
    Ok(parsed)
}
