//! Address fixtures
//!
//! Well-formed `0x` addresses that differ only in their last byte, so test
//! output stays readable.

use keeper_core::IdentityRef;

/// `0x` followed by 38 zeros and `tag` in hex.
pub fn address(tag: u8) -> String {
    format!("0x{tag:0>40x}")
}

/// [`address`] as an identity.
pub fn identity(tag: u8) -> IdentityRef {
    IdentityRef::new(address(tag))
}

/// Owner of the account under test.
pub fn owner() -> IdentityRef {
    identity(0x0a)
}

/// Address of the `index`-th guardian.
pub fn guardian_address(index: u8) -> String {
    address(0xb0_u8.wrapping_add(index))
}

pub fn guardian(index: u8) -> IdentityRef {
    IdentityRef::new(guardian_address(index))
}

/// Key the lost owner recovers to.
pub fn new_owner_address() -> String {
    address(0xee)
}

pub fn new_owner() -> IdentityRef {
    IdentityRef::new(new_owner_address())
}

/// Address with no relation to the account.
pub fn stranger() -> IdentityRef {
    identity(0xdd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_core::effects::{AddressFormat, AddressValidator};

    #[test]
    fn fixtures_are_well_formed_and_distinct() {
        let format = AddressFormat::default();
        let all = [
            owner(),
            guardian(0),
            guardian(1),
            guardian(2),
            new_owner(),
            stranger(),
        ];
        for id in &all {
            assert!(format.is_well_formed(id.as_str()), "{id}");
        }
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(address(0xab).ends_with("ab"));
    }
}
