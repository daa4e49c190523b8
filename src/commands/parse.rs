//! Parse command handler

use anyhow::{Context, Result};
use std::path::Path;

use peerlog::report::{write_report, NotifyColumns, ReportPaths};

use super::{build_parser, load_config};

/// Handle the parse command.
///
/// Parses `log` and writes the four CSV reports into `output_dir`.
#[cfg(not(tarpaulin_include))]
pub fn handle(
    config_file: Option<&Path>,
    log: &Path,
    output_dir: &Path,
    filter: Option<String>,
    notify_columns: Option<NotifyColumns>,
) -> Result<()> {
    let config = load_config(config_file)?;
    let parser = build_parser(&config, filter)?;
    let columns = notify_columns.unwrap_or(config.parse.notify_columns);

    let parsed = parser
        .parse_file(log)
        .with_context(|| format!("Failed to parse {:?}", log))?;

    let paths = ReportPaths::in_dir(output_dir);
    write_report(&parsed, &paths, columns)?;

    println!("{}", parsed.summary());
    if parsed.stats.incomplete_sessions > 0 {
        println!(
            "{} sessions without both a connect and a disconnect line were left out",
            parsed.stats.incomplete_sessions
        );
    }
    println!("Reports written to {}", output_dir.display());
    Ok(())
}
