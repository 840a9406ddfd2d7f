//! CLI configuration
//!
//! ```toml
//! store_dir = ".keeper"
//!
//! [executor]
//! latency_ms = 0
//! reject = ["remove_guardian"]
//!
//! [recovery]
//! threshold = 2
//! ```

use keeper_core::config::parse_value;
use keeper_core::effects::Operation;
use keeper_core::{KeeperConfig, KeeperError};
use keeper_recovery::RecoveryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Behaviour of the local transaction executor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Simulated confirmation latency
    pub latency_ms: u64,
    /// Operation names the executor refuses, e.g. `approve_recovery`
    pub reject: Vec<String>,
}

/// Top-level `keeper.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory holding one JSON file per account
    pub store_dir: PathBuf,
    pub executor: ExecutorConfig,
    pub recovery: RecoveryConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(".keeper"),
            executor: ExecutorConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }
}

impl KeeperConfig for CliConfig {
    fn validate(&self) -> Result<(), KeeperError> {
        if let Some(unknown) = self
            .executor
            .reject
            .iter()
            .find(|name| !Operation::NAMES.contains(&name.as_str()))
        {
            return Err(KeeperError::invalid(format!(
                "executor.reject names unknown operation {unknown:?}"
            )));
        }
        self.recovery.validate()
    }

    fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), KeeperError> {
        match key {
            "store_dir" => self.store_dir = PathBuf::from(value),
            "executor_latency_ms" => self.executor.latency_ms = parse_value(key, value)?,
            "executor_reject" => {
                self.executor.reject = value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => self.recovery.set_from_string(key, value)?,
        }
        Ok(())
    }
}

/// Load `path` if it exists, apply `KEEPER_` overrides, then validate.
pub fn load_config(path: &Path) -> Result<CliConfig, KeeperError> {
    let mut config = if path.exists() {
        CliConfig::load_from_file(path)?
    } else {
        debug!(path = %path.display(), "config file not found, using defaults");
        CliConfig::defaults()
    };
    config.merge_with_env()?;
    config.validate()?;
    Ok(config)
}
