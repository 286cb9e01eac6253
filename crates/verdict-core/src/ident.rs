// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier newtypes, timestamps, and the entity kind discriminator.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a launch (one execution run grouping tests).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaunchId(pub u64);

/// Identifier of a test context node.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub u64);

/// Identifier of a before/test/after-test record.
///
/// Unique within its [`EntityKind`] only; a `beforeTest` and a `test` may share
/// the same numeric id.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

/// Identifier of a status in the status taxonomy.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(pub u32);

/// Identifier of a status group (the upper level of the taxonomy).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusGroupId(pub u32);

macro_rules! display_inner {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

display_inner!(LaunchId, ContextId, EntityId, StatusId, StatusGroupId);

/// Wall-clock instant as Unix epoch milliseconds.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Construct from Unix epoch milliseconds.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Unix epoch milliseconds.
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// The three concrete kinds of test entity. Each kind is stored in its own
/// table; ids are only unique within a kind.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    /// Setup step executed before a test.
    BeforeTest,
    /// The test body itself.
    Test,
    /// Teardown step executed after a test.
    AfterTest,
}

impl EntityKind {
    /// All kinds in storage order.
    pub const ALL: [Self; 3] = [Self::BeforeTest, Self::Test, Self::AfterTest];

    /// Stable wire tag (`beforeTest`, `test`, `afterTest`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeforeTest => "beforeTest",
            Self::Test => "test",
            Self::AfterTest => "afterTest",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::BeforeTest => 0,
            Self::Test => 1,
            Self::AfterTest => 2,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
