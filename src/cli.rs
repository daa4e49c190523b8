//! CLI definitions for peerlog
//!
//! The clap structure lives in the library so tests and completion
//! generation can reach it without going through the binary.

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use crate::report::NotifyColumns;

/// Build clap styles.
///
/// - Green: headers, usage, command names
/// - White: placeholders and valid values
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "peerlog")]
#[command(about = "Turn monerod peer-to-peer logs into connection, notification and block reports")]
#[command(
    long_about = "peerlog - analyse the peer-to-peer activity of a Monero node.

Reads a monerod log, reconstructs each peer connection from its open, close
and reason lines, and writes CSV reports of addresses, connections,
transaction notifications and block announcements.

QUICK START:
    peerlog parse monerod.log -o out/          Write the four CSV reports
    peerlog stats monerod.log                  Print connection statistics
    peerlog enrich out/addresses.csv           Look up where peers are
    peerlog compare-blocks a.csv b.csv         Compare block arrival times

Configuration is read from ~/.config/peerlog/config.toml."
)]
#[command(version)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Use this config file instead of ~/.config/peerlog/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a log into CSV reports
    #[command(long_about = "Parse a monerod log into CSV reports.

Writes addresses.csv, connections.csv, notifications.csv and blocks.csv to
the output directory, which is created if missing. Connections are only
reported once both their open and close lines were seen.

EXAMPLES:
    peerlog parse monerod.log
    peerlog parse monerod.log -o reports/ --filter 18080
    peerlog parse old.log --notify-columns timestamp-first")]
    Parse {
        /// Log file to parse
        log: PathBuf,
        /// Directory for the reports
        #[arg(long, short, default_value = ".")]
        output_dir: PathBuf,
        /// Only consider lines containing this text
        #[arg(long, short)]
        filter: Option<String>,
        /// Column order of notifications.csv
        #[arg(long, value_enum)]
        notify_columns: Option<NotifyColumns>,
    },

    /// Look up location and category of peer addresses
    #[command(long_about = "Look up location and category of peer addresses.

Reads an address list (such as addresses.csv), queries the lookup service
for every address not in the cache yet and prints the results as JSON.
Querying stops at the first failure, which usually means the daily request
limit is reached; already known addresses are still reported.

EXAMPLES:
    peerlog enrich out/addresses.csv
    peerlog enrich out/addresses.csv --output infos.json")]
    Enrich {
        /// Address list, one IP per line
        addresses: PathBuf,
        /// Cache file (defaults to [enrich].cache_file)
        #[arg(long)]
        cache: Option<PathBuf>,
        /// Write the JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Refresh the Tor exit node list
    #[command(long_about = "Download the current Tor exit nodes and merge them into the list file.

Nodes are never removed from the list, so addresses in older logs keep
their category.

EXAMPLES:
    peerlog tor-update
    peerlog tor-update --file lists/torip")]
    TorUpdate {
        /// List file (defaults to the TOR entry of [[enrich.categories]])
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print statistics for a log or a report directory
    #[command(long_about = "Print statistics for a log or a report directory.

Shows connection durations, notifications per peer and the peak number of
open connections. With --enrich, also connections per peer category and
the origin countries of uncategorized peers.

A directory is read as reports written by `peerlog parse`; the filter
does not apply to it.

EXAMPLES:
    peerlog stats monerod.log
    peerlog stats monerod.log --enrich
    peerlog stats reports/")]
    Stats {
        /// Log file, or a directory holding addresses.csv, connections.csv
        /// and notifications.csv
        log: PathBuf,
        /// Only consider lines containing this text
        #[arg(long, short)]
        filter: Option<String>,
        /// Include category and origin statistics (uses the lookup cache)
        #[arg(long)]
        enrich: bool,
    },

    /// Compare block arrival times between nodes
    #[command(long_about = "Compare block arrival times between nodes.

Takes the blocks.csv of two or more nodes. For every pair, writes
<A>_vs_<B>.csv with the difference in seconds between the first arrivals of
each block height both nodes saw, and prints min, max and mean.

EXAMPLES:
    peerlog compare-blocks normal.csv tor.csv
    peerlog compare-blocks a.csv b.csv c.csv -o deltas/")]
    CompareBlocks {
        /// Block reports to compare
        #[arg(required = true, num_args = 2..)]
        files: Vec<PathBuf>,
        /// Directory for the comparison files
        #[arg(long, short, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show,
    /// Print the config file location
    Path,
    /// Write the default configuration to the config file
    #[command(long_about = "Write the default configuration to the config file.

Creates ~/.config/peerlog/config.toml (or the --config file) with every
setting at its default, ready for editing. An existing file is kept
unless --force is given.

EXAMPLES:
    peerlog config init
    peerlog --config ./peerlog.toml config init --force")]
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}
