//! Config subcommands handler

use anyhow::{bail, Result};
use std::path::Path;

use peerlog::Config;

use super::load_config;

/// Show the effective configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show(config_file: Option<&Path>) -> Result<()> {
    let config = load_config(config_file)?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Print the config file location.
#[cfg(not(tarpaulin_include))]
pub fn handle_path(config_file: Option<&Path>) -> Result<()> {
    let path = match config_file {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };
    println!("{}", path.display());
    Ok(())
}

/// Write the default configuration, refusing to replace an existing file
/// unless `force` is set.
#[cfg(not(tarpaulin_include))]
pub fn handle_init(config_file: Option<&Path>, force: bool) -> Result<()> {
    let path = match config_file {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };
    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    let config = Config::default();
    match config_file {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    println!("Wrote default config to {}", path.display());
    Ok(())
}
