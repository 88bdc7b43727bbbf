//! STRATO account and contract addresses.

use ethereum_types::H160 as WrappedAddress;
use rustc_hex::{FromHex, ToHex};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, ops::Deref, str::FromStr};

/// Account or contract address.
///
/// The node speaks lowercase hex without `0x` prefix, which is also
/// what [`Display`](fmt::Display) produces. Parsing accepts both forms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, SerializeDisplay, DeserializeFromStr)]
pub struct Address(WrappedAddress);

/// Address parsing failures.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum AddressValidationError {
    /// Not a hex string
    #[error("Address is not valid hex: {0}")]
    InvalidHex(String),
    /// Hex decoded to a wrong number of bytes
    #[error("Address must be {expected} bytes long, got {got}")]
    InvalidLength {
        /// Required width
        expected: usize,
        /// Decoded width
        got: usize,
    },
}

impl Deref for Address {
    type Target = WrappedAddress;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        let bytes: Vec<u8> = body
            .from_hex()
            .map_err(|_| AddressValidationError::InvalidHex(s.to_string()))?;
        if bytes.len() != Self::WIDTH {
            return Err(AddressValidationError::InvalidLength {
                expected: Self::WIDTH,
                got: bytes.len(),
            });
        }
        Ok(Self(WrappedAddress::from_slice(&bytes)))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.as_bytes().to_hex::<String>())
    }
}

impl<T: Into<WrappedAddress>> From<T> for Address {
    fn from(s: T) -> Self {
        Self(s.into())
    }
}

impl Address {
    /// Size of underlying array in bytes.
    pub const WIDTH: usize = 20;

    pub fn to_hex(&self) -> String {
        //! Encode as a hex string with `0x` prefix.
        format!("0x{self}")
    }
}
