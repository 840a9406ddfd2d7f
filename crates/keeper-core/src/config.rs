//! Configuration loading contract
//!
//! Configuration types are plain serde structs read from TOML. Layering is:
//! defaults, then the file, then `KEEPER_`-prefixed environment variables, then
//! validation.

use crate::KeeperError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Core trait for Keeper configuration types
pub trait KeeperConfig: Clone + Default + DeserializeOwned + Send + Sync + 'static {
    /// Prefix for environment overrides
    const ENV_PREFIX: &'static str = "KEEPER_";

    /// Get default configuration values
    fn defaults() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    fn from_toml_str(content: &str) -> Result<Self, KeeperError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    fn load_from_file(path: &Path) -> Result<Self, KeeperError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KeeperError::invalid(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Apply overrides from `(name, value)` pairs carrying [`Self::ENV_PREFIX`].
    ///
    /// `KEEPER_CONFIRMATION_TIMEOUT_MS` maps to key `confirmation_timeout_ms`.
    /// Pairs without the prefix are ignored.
    fn merge_with_vars<I>(&mut self, vars: I) -> Result<(), KeeperError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            if let Some(key) = name.strip_prefix(Self::ENV_PREFIX) {
                self.set_from_string(&key.to_lowercase(), &value)?;
            }
        }
        Ok(())
    }

    /// Merge with process environment variables
    fn merge_with_env(&mut self) -> Result<(), KeeperError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), KeeperError>;

    /// Set a configuration value from a string (for CLI and env parsing).
    ///
    /// Unknown keys are ignored so unrelated `KEEPER_` variables do not break
    /// loading.
    fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), KeeperError>;
}

/// Parse a scalar override, naming the key in the error.
pub fn parse_value<T>(key: &str, value: &str) -> Result<T, KeeperError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| KeeperError::invalid(format!("Invalid value for {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    struct SampleConfig {
        retries: u32,
        label: String,
    }

    impl KeeperConfig for SampleConfig {
        fn validate(&self) -> Result<(), KeeperError> {
            if self.retries > 10 {
                return Err(KeeperError::invalid("retries must be at most 10"));
            }
            Ok(())
        }

        fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), KeeperError> {
            match key {
                "retries" => self.retries = parse_value(key, value)?,
                "label" => self.label = value.to_string(),
                _ => {}
            }
            Ok(())
        }
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = SampleConfig::from_toml_str("retries = 3").unwrap();
        assert_eq!(config.retries, 3);
        assert!(config.label.is_empty());
    }

    #[test]
    fn prefixed_vars_are_applied_and_others_ignored() {
        let mut config = SampleConfig::defaults();
        config
            .merge_with_vars(vec![
                ("KEEPER_RETRIES".to_string(), "7".to_string()),
                ("KEEPER_UNKNOWN".to_string(), "x".to_string()),
                ("RETRIES".to_string(), "9".to_string()),
            ])
            .unwrap();
        assert_eq!(config.retries, 7);
    }

    #[test]
    fn bad_override_names_the_key() {
        let mut config = SampleConfig::defaults();
        let err = config
            .merge_with_vars(vec![("KEEPER_RETRIES".to_string(), "many".to_string())])
            .unwrap_err();
        assert_matches!(err, KeeperError::Invalid { ref message } if message.contains("retries"));
    }

    #[test]
    fn load_from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keeper.toml");
        std::fs::write(&path, "label = \"primary\"\nretries = 2\n").unwrap();

        let config = SampleConfig::load_from_file(&path).unwrap();
        assert_eq!(config.label, "primary");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_is_invalid() {
        let err = SampleConfig::load_from_file(Path::new("/nonexistent/keeper.toml")).unwrap_err();
        assert_matches!(err, KeeperError::Invalid { .. });
    }
}
