//! Address format validation.

use serde::{Deserialize, Serialize};

/// Decides whether a candidate string is a well-formed account address.
pub trait AddressValidator: Send + Sync {
    /// `true` when `candidate` may be used as an [`crate::IdentityRef`].
    fn is_well_formed(&self, candidate: &str) -> bool;
}

/// Fixed-prefix, fixed-length address rule.
///
/// The default matches 20-byte hex account addresses: a `0x` prefix and 42
/// characters in total. Only prefix and length are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressFormat {
    /// Required leading text
    pub prefix: String,
    /// Exact length in characters, prefix included
    pub length: usize,
}

impl Default for AddressFormat {
    fn default() -> Self {
        Self {
            prefix: "0x".to_string(),
            length: 42,
        }
    }
}

impl AddressValidator for AddressFormat {
    fn is_well_formed(&self, candidate: &str) -> bool {
        candidate.starts_with(&self.prefix) && candidate.chars().count() == self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_format_accepts_hex_account_address() {
        let format = AddressFormat::default();
        assert!(format.is_well_formed("0x1234567890abcdef1234567890abcdef12345678"));
        assert!(format.is_well_formed("0xabcdef1234567890abcdef1234567890abcdef12"));
    }

    #[test]
    fn default_format_rejects_wrong_prefix_or_length() {
        let format = AddressFormat::default();
        assert!(!format.is_well_formed(""));
        assert!(!format.is_well_formed("0x1234"));
        assert!(!format.is_well_formed("1x1234567890abcdef1234567890abcdef12345678"));
        assert!(!format.is_well_formed("0x1234567890abcdef1234567890abcdef123456789"));
    }

    #[test]
    fn custom_format_is_respected() {
        let format = AddressFormat {
            prefix: "acct_".to_string(),
            length: 9,
        };
        assert!(format.is_well_formed("acct_1234"));
        assert!(!format.is_well_formed("0x1234567"));
    }

    proptest! {
        #[test]
        fn any_suffix_of_right_length_is_accepted(suffix in "[0-9a-f]{40}") {
            let candidate = format!("0x{suffix}");
            prop_assert!(AddressFormat::default().is_well_formed(&candidate));
        }

        #[test]
        fn other_lengths_are_rejected(suffix in "[0-9a-f]{0,80}") {
            prop_assume!(suffix.len() != 40);
            let candidate = format!("0x{suffix}");
            prop_assert!(!AddressFormat::default().is_well_formed(&candidate));
        }
    }
}
