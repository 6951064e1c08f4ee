//! Invitation code inputs: the secret token and the scope it is valid for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::{DecodeError, Identity, decode_hex};

/// The secret invitation token as handed to an invitee.
///
/// `Debug` never prints the content so codes cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct RawCode(Vec<u8>);

impl RawCode {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Concatenate `salt` and `secret` into a single code.
    ///
    /// Lets one shared secret be handed out as many independent codes, one per salt.
    #[must_use]
    pub fn salted(salt: &[u8], secret: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(salt.len() + secret.len());
        bytes.extend_from_slice(salt);
        bytes.extend_from_slice(secret);
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawCode").field(&"[REDACTED]").finish()
    }
}

impl From<&str> for RawCode {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<&[u8]> for RawCode {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for RawCode {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// The context an invitation code is valid for, such as an event or application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scope(Vec<u8>);

impl Scope {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl FromStr for Scope {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex(s).map(Self)
    }
}

impl From<Identity> for Scope {
    fn from(value: Identity) -> Self {
        Self::new(value.as_bytes().as_slice())
    }
}

impl From<&str> for Scope {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl TryFrom<String> for Scope {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Scope> for String {
    fn from(value: Scope) -> Self {
        value.to_string()
    }
}
