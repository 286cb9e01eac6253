// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Content hashing of ordered argument lists.
//!
//! The hash is BLAKE3 over a domain-separated (`b"arguments:"`), length-prefixed
//! canonical encoding:
//!
//! ```text
//! count:u64le ( len:u64le name  len:u64le type  tag:u8 [len:u64le value] )*
//! ```
//!
//! `tag` is `0` for an absent value and `1` for a present one, so `None` and
//! `Some("")` never collide. Element order is part of the encoding.
//!
//! An empty list does not hash: it maps to [`ArgumentsHash::NO_ARGUMENTS`].
use std::fmt;
use std::str::FromStr;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

/// One declared input of a test: `{name, type, value}`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Argument {
    /// Parameter name.
    pub name: String,
    /// Declared type, as reported by the client (free text).
    #[serde(rename = "type")]
    pub ty: String,
    /// Rendered value; `None` when the client sent `null`.
    #[serde(default)]
    pub value: Option<String>,
}

impl Argument {
    /// Build an argument with a present value.
    pub fn new(name: impl Into<String>, ty: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            value: Some(value.into()),
        }
    }

    /// Build an argument whose value is `null`.
    pub fn null(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            value: None,
        }
    }
}

/// Failure to parse a 64-character hex identity key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    /// The input was not exactly 64 bytes long.
    #[error("[KEY_LENGTH] expected 64 hex characters, got {0} bytes")]
    Length(usize),
    /// The input contained a character outside `[0-9a-fA-F]`.
    #[error("[KEY_NOT_HEX] key contains non-hex characters")]
    NotHex,
}

pub(crate) fn parse_key(s: &str) -> Result<[u8; 32], KeyParseError> {
    if s.len() != 64 {
        return Err(KeyParseError::Length(s.len()));
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(s, &mut out).map_err(|_| KeyParseError::NotHex)?;
    Ok(out)
}

/// Content hash of an argument list.
///
/// Renders as 64 lowercase hex characters. Only equality is meaningful.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArgumentsHash(pub [u8; 32]);

impl ArgumentsHash {
    /// Reserved value for an empty or absent argument list.
    pub const NO_ARGUMENTS: Self = Self([0; 32]);

    /// View the hash as bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns `true` for the "no arguments" sentinel.
    pub fn is_no_arguments(&self) -> bool {
        *self == Self::NO_ARGUMENTS
    }
}

impl fmt::Display for ArgumentsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ArgumentsHash {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s).map(Self)
    }
}

impl TryFrom<String> for ArgumentsHash {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArgumentsHash> for String {
    fn from(value: ArgumentsHash) -> Self {
        value.to_string()
    }
}

fn update_field(hasher: &mut Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Hash an ordered argument list.
///
/// Total: never fails. Empty input yields [`ArgumentsHash::NO_ARGUMENTS`].
pub fn hash_arguments(items: &[Argument]) -> ArgumentsHash {
    if items.is_empty() {
        return ArgumentsHash::NO_ARGUMENTS;
    }
    let mut hasher = Hasher::new();
    hasher.update(b"arguments:");
    hasher.update(&(items.len() as u64).to_le_bytes());
    for item in items {
        update_field(&mut hasher, item.name.as_bytes());
        update_field(&mut hasher, item.ty.as_bytes());
        match &item.value {
            None => {
                hasher.update(&[0]);
            }
            Some(value) => {
                hasher.update(&[1]);
                update_field(&mut hasher, value.as_bytes());
            }
        }
    }
    ArgumentsHash(hasher.finalize().into())
}
