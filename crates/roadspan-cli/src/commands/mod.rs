//! Command implementations

mod config;
mod resolve;
mod validate;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use roadspan_core::config::LayeredConfig;

/// Layered resolver configuration: defaults, then the config file, then
/// `ROADSPAN_*` variables, then command-line flags
pub fn layered_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut layered = LayeredConfig::with_defaults();
    if let Some(path) = &cli.config {
        layered = layered
            .load_from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
    }
    let mut layered = layered.load_from_env();
    layered.update_from_cli(cli.config_overrides());
    Ok(layered)
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let layered = layered_config(&cli)?;

    match &cli.command {
        Commands::Resolve(args) => resolve::execute(&cli, args, &layered, &output).await,
        Commands::ValidateKm(args) => validate::execute(&cli, args, &layered, &output).await,
        Commands::Config => config::execute(&layered, &output),
    }
}
