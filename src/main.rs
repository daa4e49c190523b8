//! peerlog - CLI entry point

mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use peerlog::cli::{Cli, Commands, ConfigCommands};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` selects info and `-vv` debug.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Parse {
            log,
            output_dir,
            filter,
            notify_columns,
        } => commands::parse::handle(config_file, &log, &output_dir, filter, notify_columns),
        Commands::Enrich {
            addresses,
            cache,
            output,
        } => commands::enrich::handle(config_file, &addresses, cache, output),
        Commands::TorUpdate { file } => commands::tor::handle(config_file, file),
        Commands::Stats {
            log,
            filter,
            enrich,
        } => commands::stats::handle(config_file, &log, filter, enrich),
        Commands::CompareBlocks { files, output_dir } => {
            commands::compare::handle(&files, &output_dir)
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(config_file),
            ConfigCommands::Path => commands::config::handle_path(config_file),
            ConfigCommands::Init { force } => commands::config::handle_init(config_file, force),
        },
        Commands::Completions { shell } => {
            commands::completions::handle(shell, &mut Cli::command())
        }
    }
}
