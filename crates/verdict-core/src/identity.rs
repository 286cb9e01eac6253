// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Correlation keys and identity assignment for new test entities.
//!
//! A derived correlation id is `blake3("correlation:" || kind || ":" || title)`.
//! Title is the only content input, so two unrelated tests with the same title
//! and kind share a correlation id across contexts and launches.
use std::fmt;
use std::str::FromStr;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use crate::hash::{hash_arguments, parse_key, ArgumentsHash, KeyParseError};
use crate::ident::EntityKind;
use crate::model::NewTestEntity;

/// Stable key shared by every run of the same logical test.
///
/// Renders as 64 lowercase hex characters. Caller-supplied keys are accepted
/// verbatim once they parse; no uniqueness is implied.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationId(pub [u8; 32]);

impl CorrelationId {
    /// View the key as bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for CorrelationId {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s).map(Self)
    }
}

impl TryFrom<String> for CorrelationId {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CorrelationId> for String {
    fn from(value: CorrelationId) -> Self {
        value.to_string()
    }
}

/// Produces a stable, domain-separated correlation id (prefix `b"correlation:"`)
/// from an entity kind and title.
pub fn derive_correlation_id(kind: EntityKind, title: &str) -> CorrelationId {
    let mut hasher = Hasher::new();
    hasher.update(b"correlation:");
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(title.as_bytes());
    CorrelationId(hasher.finalize().into())
}

/// The three identity columns of a test entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityIdentity {
    /// Correlation key.
    pub correlation_id: CorrelationId,
    /// Hash of the declared arguments.
    pub arguments_hash: ArgumentsHash,
    /// Hash of the external arguments.
    pub external_arguments_hash: ArgumentsHash,
}

/// Fill in whichever identity fields the caller left out.
///
/// Supplied values win; missing ones are derived from the title and argument
/// lists. Pure, total.
pub fn assign_identity(kind: EntityKind, candidate: &NewTestEntity) -> EntityIdentity {
    EntityIdentity {
        correlation_id: candidate
            .correlation_id
            .unwrap_or_else(|| derive_correlation_id(kind, &candidate.title)),
        arguments_hash: candidate
            .arguments_hash
            .unwrap_or_else(|| hash_arguments(&candidate.arguments)),
        external_arguments_hash: candidate
            .external_arguments_hash
            .unwrap_or_else(|| hash_arguments(&candidate.external_arguments)),
    }
}
