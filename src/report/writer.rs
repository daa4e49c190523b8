//! CSV report writer

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Duration;
use tracing::info;

use super::{
    NotifyColumns, ReportPaths, ADDRESSES_HEADER, BLOCKS_HEADER, BLOCK_DELTAS_HEADER,
    CONNECTIONS_HEADER, NOT_AVAILABLE, NO_REASON,
};
use crate::logparse::{BlockRecord, ConnectionRecord, NotificationRecord, ParsedLog, Timestamp};

fn write_row<W: Write>(writer: &mut W, values: &[&str]) -> io::Result<()> {
    for value in values {
        write!(writer, "{},", value)?;
    }
    writeln!(writer)
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

fn ts_or_na(value: Option<&Timestamp>) -> &str {
    value.map_or(NOT_AVAILABLE, Timestamp::as_str)
}

pub fn write_addresses<W: Write>(writer: &mut W, addresses: &BTreeSet<String>) -> io::Result<()> {
    writeln!(writer, "{}", ADDRESSES_HEADER)?;
    for address in addresses {
        write_row(writer, &[address.as_str()])?;
    }
    Ok(())
}

pub fn write_connections<W: Write>(
    writer: &mut W,
    connections: &[ConnectionRecord],
) -> io::Result<()> {
    writeln!(writer, "{}", CONNECTIONS_HEADER)?;
    for record in connections {
        write_row(
            writer,
            &[
                or_na(record.peer.as_deref()),
                ts_or_na(record.connected_at.as_ref()),
                ts_or_na(record.disconnected_at.as_ref()),
                record.reason.as_deref().unwrap_or(NO_REASON),
            ],
        )?;
    }
    Ok(())
}

pub fn write_notifications<W: Write>(
    writer: &mut W,
    notifications: &[NotificationRecord],
    columns: NotifyColumns,
) -> io::Result<()> {
    writeln!(writer, "{}", columns.header())?;
    for record in notifications {
        let peer = or_na(record.peer.as_deref());
        let timestamp = ts_or_na(record.timestamp.as_ref());
        match columns {
            NotifyColumns::IpFirst => write_row(writer, &[peer, timestamp])?,
            NotifyColumns::TimestampFirst => write_row(writer, &[timestamp, peer])?,
        }
    }
    Ok(())
}

pub fn write_blocks<W: Write>(writer: &mut W, blocks: &[BlockRecord]) -> io::Result<()> {
    writeln!(writer, "{}", BLOCKS_HEADER)?;
    for record in blocks {
        let height = record.height.to_string();
        write_row(
            writer,
            &[
                or_na(record.peer.as_deref()),
                ts_or_na(record.timestamp.as_ref()),
                height.as_str(),
            ],
        )?;
    }
    Ok(())
}

/// Arrival differences per block height, in seconds with millisecond precision.
pub fn write_block_deltas<W: Write>(writer: &mut W, deltas: &[(u64, Duration)]) -> io::Result<()> {
    writeln!(writer, "{}", BLOCK_DELTAS_HEADER)?;
    for (height, delta) in deltas {
        let height = height.to_string();
        let seconds = format!("{:.3}", delta.num_milliseconds() as f64 / 1000.0);
        write_row(writer, &[height.as_str(), seconds.as_str()])?;
    }
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<fs::File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    let file =
        fs::File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    Ok(BufWriter::new(file))
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> io::Result<()>,
{
    let mut writer = create(path)?;
    write(&mut writer).with_context(|| format!("Failed to write file: {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write file: {:?}", path))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

/// Write all four reports for `parsed`.
pub fn write_report(parsed: &ParsedLog, paths: &ReportPaths, columns: NotifyColumns) -> Result<()> {
    write_file(&paths.addresses, |w| write_addresses(w, &parsed.addresses))?;
    write_file(&paths.connections, |w| {
        write_connections(w, &parsed.connections)
    })?;
    write_file(&paths.notifications, |w| {
        write_notifications(w, &parsed.notifications, columns)
    })?;
    write_file(&paths.blocks, |w| write_blocks(w, &parsed.blocks))?;
    Ok(())
}

/// Write block deltas to a file.
pub fn write_block_deltas_file(path: &Path, deltas: &[(u64, Duration)]) -> Result<()> {
    write_file(path, |w| write_block_deltas(w, deltas))
}
