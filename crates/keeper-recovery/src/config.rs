//! Recovery configuration
//!
//! ```toml
//! threshold = 2
//! activation = "on_confirmation"          # or "on_execution", or { after_delay = { delay_ms = 5000 } }
//! removal_during_recovery = "block"       # or "allow"
//! confirmation_timeout_ms = 30000
//! event_buffer = 256
//!
//! [address]
//! prefix = "0x"
//! length = 42
//! ```

use crate::threshold::CountThreshold;
use keeper_core::config::parse_value;
use keeper_core::effects::AddressFormat;
use keeper_core::{KeeperConfig, KeeperError};
use serde::{Deserialize, Serialize};

/// When a `Pending` guardian becomes `Active`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
    /// Only through an explicit activation call
    #[default]
    OnConfirmation,
    /// As soon as the add transaction is confirmed
    OnExecution,
    /// A fixed delay after the add transaction is confirmed
    AfterDelay { delay_ms: u64 },
}

impl std::str::FromStr for ActivationPolicy {
    type Err = String;

    /// Accepts `on_confirmation`, `on_execution` and `after_delay:<ms>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_confirmation" => Ok(Self::OnConfirmation),
            "on_execution" => Ok(Self::OnExecution),
            other => other
                .strip_prefix("after_delay:")
                .and_then(|ms| ms.parse().ok())
                .map(|delay_ms| Self::AfterDelay { delay_ms })
                .ok_or_else(|| format!("unknown activation policy {other:?}")),
        }
    }
}

/// Whether guardians may be removed while a recovery is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Refuse with `GuardianLockedByActiveRecovery`
    #[default]
    Block,
    /// Permit; approvals already given keep counting
    Allow,
}

impl std::str::FromStr for RemovalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(Self::Block),
            "allow" => Ok(Self::Allow),
            other => Err(format!("unknown removal policy {other:?}")),
        }
    }
}

/// Recovery behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Approvals a new request must collect
    pub threshold: u32,
    pub activation: ActivationPolicy,
    pub removal_during_recovery: RemovalPolicy,
    /// Upper bound on waiting for a transaction; `None` waits indefinitely
    pub confirmation_timeout_ms: Option<u64>,
    /// Address rule used for guardians, owners and recovery targets
    pub address: AddressFormat,
    /// Capacity of the broadcast notification channel
    pub event_buffer: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            threshold: 1,
            activation: ActivationPolicy::default(),
            removal_during_recovery: RemovalPolicy::default(),
            confirmation_timeout_ms: None,
            address: AddressFormat::default(),
            event_buffer: 256,
        }
    }
}

impl RecoveryConfig {
    /// Quorum rule derived from [`Self::threshold`].
    pub fn quorum_policy(&self) -> Result<CountThreshold, KeeperError> {
        CountThreshold::from_count(self.threshold)
            .ok_or_else(|| KeeperError::invalid("threshold must be at least 1"))
    }
}

impl KeeperConfig for RecoveryConfig {
    fn validate(&self) -> Result<(), KeeperError> {
        self.quorum_policy()?;
        if self.event_buffer == 0 {
            return Err(KeeperError::invalid("event_buffer must be at least 1"));
        }
        if self.confirmation_timeout_ms == Some(0) {
            return Err(KeeperError::invalid(
                "confirmation_timeout_ms must be positive when set",
            ));
        }
        if self.address.length <= self.address.prefix.chars().count() {
            return Err(KeeperError::invalid(
                "address length must exceed the prefix length",
            ));
        }
        Ok(())
    }

    fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), KeeperError> {
        match key {
            "threshold" => self.threshold = parse_value(key, value)?,
            "activation" => self.activation = parse_value(key, value)?,
            "removal_during_recovery" => self.removal_during_recovery = parse_value(key, value)?,
            "confirmation_timeout_ms" => {
                self.confirmation_timeout_ms = if value.is_empty() {
                    None
                } else {
                    Some(parse_value(key, value)?)
                };
            }
            "event_buffer" => self.event_buffer = parse_value(key, value)?,
            "address_prefix" => self.address.prefix = value.to_string(),
            "address_length" => self.address.length = parse_value(key, value)?,
            _ => {}
        }
        Ok(())
    }
}
