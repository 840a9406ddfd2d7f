//! Config command handler.

use crate::config::CliConfig;
use anyhow::Result;

/// Render the effective configuration as TOML.
pub fn handle_config(config: &CliConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
