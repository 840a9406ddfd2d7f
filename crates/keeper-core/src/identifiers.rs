//! Identifier value types
//!
//! [`IdentityRef`] is the opaque address of an owner, guardian, or recovery
//! target. [`AccountId`] names the consistency domain a registry and its recovery
//! request belong to, and stays stable when ownership moves. [`RequestId`] names a
//! single recovery attempt.

use crate::effects::AddressValidator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque, immutable account address.
///
/// Equality is plain value equality of the address text. Format checks are the
/// business of an [`AddressValidator`] at the boundary; once constructed the
/// value is never reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityRef(String);

impl IdentityRef {
    /// Wrap an address that was already authenticated or validated elsewhere.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Wrap `candidate` only if `validator` accepts it.
    pub fn parse_with(candidate: &str, validator: &dyn AddressValidator) -> Option<Self> {
        validator
            .is_well_formed(candidate)
            .then(|| Self(candidate.to_string()))
    }

    /// Borrow the address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IdentityRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Account identifier
///
/// Each protected account has a unique AccountId that survives ownership
/// transfers, so stores and coordinators can key on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create an account ID from caller-provided entropy.
    pub fn new_from_entropy(entropy: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(entropy))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AccountId(Uuid::parse_str(s)?))
    }
}

/// Recovery request identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RequestId(Uuid::parse_str(s)?))
    }
}
