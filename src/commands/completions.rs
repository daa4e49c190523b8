//! Completions command handler

use anyhow::Result;
use clap_complete::{generate, Shell as CompletionShell};
use std::io;

/// Write the completion script for `shell` to stdout.
#[cfg(not(tarpaulin_include))]
pub fn handle(shell: CompletionShell, cmd: &mut clap::Command) -> Result<()> {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut io::stdout());
    Ok(())
}
