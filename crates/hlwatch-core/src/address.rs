//! Tracked account addresses.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Required prefix for an account address.
pub const ADDRESS_PREFIX: &str = "0x";

/// Total length of an account address, prefix included.
pub const ADDRESS_LEN: usize = 42;

/// Length of the shortened label used in chat messages.
const SHORT_LEN: usize = 7;

/// A validated account address (`0x` followed by 40 hex digits).
///
/// Addresses are compared verbatim, so `0xAB..` and `0xab..` are distinct
/// entries in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserAddress(String);

impl UserAddress {
    /// Parse and validate an address.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let valid = raw.len() == ADDRESS_LEN
            && raw
                .strip_prefix(ADDRESS_PREFIX)
                .is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()));
        if !valid {
            return Err(CoreError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short label for message headers (e.g., "0x5d2f4").
    pub fn short(&self) -> &str {
        shorten(&self.0)
    }
}

/// Shorten an address-like string to its first 7 characters.
///
/// Strings that do not look like addresses are returned unchanged.
pub fn shorten(raw: &str) -> &str {
    if raw.starts_with(ADDRESS_PREFIX) && raw.len() > SHORT_LEN {
        raw.get(..SHORT_LEN).unwrap_or(raw)
    } else {
        raw
    }
}

impl fmt::Display for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserAddress {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<UserAddress> for String {
    fn from(address: UserAddress) -> Self {
        address.0
    }
}

impl std::str::FromStr for UserAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
