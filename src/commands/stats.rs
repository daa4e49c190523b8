//! Stats command handler

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use peerlog::report::{read_report, ReportPaths};
use peerlog::stats::{
    connection_durations, connection_timeline, connection_types, format_seconds,
    notifications_per_peer, origins_by_country, DurationSummary,
};
use peerlog::{IpInfo, ParsedLog};

use super::{build_parser, enrich_addresses, load_config};

/// Number of busiest peers listed.
const TOP_PEERS: usize = 10;

/// Handle the stats command.
///
/// `source` is either a raw log or a directory of reports from `parse`.
#[cfg(not(tarpaulin_include))]
pub fn handle(
    config_file: Option<&Path>,
    source: &Path,
    filter: Option<String>,
    enrich: bool,
) -> Result<()> {
    let config = load_config(config_file)?;

    let parsed = if source.is_dir() {
        if filter.is_some() {
            warn!("--filter is ignored when reading reports");
        }
        let parsed = read_report(&ReportPaths::in_dir(source))
            .with_context(|| format!("Failed to read reports in {:?}", source))?;
        println!(
            "{} addresses, {} connections, {} notifications (reports in {})",
            parsed.addresses.len(),
            parsed.connections.len(),
            parsed.notifications.len(),
            source.display()
        );
        parsed
    } else {
        let parser = build_parser(&config, filter)?;
        let parsed = parser
            .parse_file(source)
            .with_context(|| format!("Failed to parse {:?}", source))?;
        println!("{}", parsed.summary());
        parsed
    };

    print_connections(&parsed);
    print_notifications(&parsed);

    if enrich {
        let infos = enrich_addresses(&config, &parsed.addresses, &config.cache_file())?;
        print_categories(&parsed, &infos);
    }
    Ok(())
}

fn print_connections(parsed: &ParsedLog) {
    let durations = connection_durations(&parsed.connections);
    let all = durations.values().flatten().copied();

    println!();
    println!("Connections: {}", parsed.connections.len());
    if let Some(summary) = DurationSummary::from_durations(all) {
        println!(
            "  duration: min {}, max {}, mean {} over {} connections",
            format_seconds(summary.min),
            format_seconds(summary.max),
            format_seconds(summary.mean),
            summary.count
        );
    }

    let timeline = connection_timeline(&parsed.connections);
    if let Some((at, open)) = timeline.iter().max_by_key(|(_, open)| *open) {
        println!("  peak open connections: {} at {}", open, at);
    }
}

fn print_notifications(parsed: &ParsedLog) {
    let per_peer = notifications_per_peer(&parsed.notifications);

    println!();
    println!(
        "Notifications: {} from {} peers",
        parsed.notifications.len(),
        per_peer.len()
    );

    let mut busiest: Vec<_> = per_peer.into_iter().collect();
    busiest.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (peer, count) in busiest.into_iter().take(TOP_PEERS) {
        println!("  {:<16} {}", peer, count);
    }
}

fn print_categories(parsed: &ParsedLog, infos: &BTreeMap<String, IpInfo>) {
    println!();
    println!("Connections per category:");
    for (label, count) in connection_types(&parsed.connections, infos) {
        println!("  {:<16} {}", label, count);
    }

    println!();
    println!("Origins of uncategorized peers:");
    for (country, count) in origins_by_country(&parsed.addresses, infos) {
        println!("  {:<16} {}", country, count);
    }
}
