use std::fmt;
use std::str::FromStr;

use hex::FromHexError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of an [`Identity`] in bytes (address-sized).
pub const IDENTITY_LEN: usize = 20;

/// Width of a [`Fingerprint`] in bytes (one SHA-256 digest).
pub const FINGERPRINT_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("odd number of hex digits")]
    OddLength,
    #[error("invalid hex digit {digit:?} at {index}")]
    InvalidDigit { digit: char, index: usize },
}

/// An account identity: the owner of a registry, a caller, or a claimant.
///
/// Displays as `0x`-prefixed lowercase hex and serializes the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    #[must_use]
    pub const fn new(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed(s).map(Self)
    }
}

impl TryFrom<String> for Identity {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.to_string()
    }
}

/// Scope-bound digest of an invitation code. The registry's only storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed(s).map(Self)
    }
}

impl TryFrom<&[u8]> for Fingerprint {
    type Error = DecodeError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        <[u8; FINGERPRINT_LEN]>::try_from(value)
            .map(Self)
            .map_err(|_| DecodeError::Length {
                expected: FINGERPRINT_LEN,
                actual: value.len(),
            })
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.to_hex()
    }
}

fn hex_error(err: FromHexError, expected: usize, digits: &str) -> DecodeError {
    match err {
        FromHexError::InvalidHexCharacter { c, index } => {
            DecodeError::InvalidDigit { digit: c, index }
        }
        FromHexError::OddLength => DecodeError::OddLength,
        FromHexError::InvalidStringLength => DecodeError::Length {
            expected,
            actual: digits.len() / 2,
        },
    }
}

/// Decode an optionally `0x`-prefixed hex string into a variable-length buffer.
pub(crate) fn decode_hex(s: &str) -> Result<Vec<u8>, DecodeError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|err| hex_error(err, digits.len() / 2, digits))
}

/// Decode an optionally `0x`-prefixed hex string of exactly `N` bytes.
fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], DecodeError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|err| hex_error(err, N, digits))?;
    Ok(out)
}
