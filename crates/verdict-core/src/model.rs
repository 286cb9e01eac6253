// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stored records, creation inputs, and patches.
//!
//! Identity fields (`launch_id`, `correlation_id`, both hashes) are fixed at
//! creation; patches cannot express a change to them.
use serde::{Deserialize, Serialize};

use crate::hash::{Argument, ArgumentsHash};
use crate::ident::{ContextId, EntityId, EntityKind, LaunchId, StatusId, Timestamp};
use crate::identity::CorrelationId;

/// A persisted before/test/after-test row.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEntityRecord {
    /// Row id, unique within the record's kind.
    pub id: EntityId,
    /// Owning launch.
    pub launch_id: LaunchId,
    /// Enclosing context, if any. Always in the same launch.
    pub parent_context_id: Option<ContextId>,
    /// Human-readable title.
    pub title: String,
    /// When the record was created.
    pub created_timestamp: Timestamp,
    /// When execution started.
    pub started_timestamp: Option<Timestamp>,
    /// When execution finished.
    pub finished_timestamp: Option<Timestamp>,
    /// Outcome, if reported.
    pub status_id: Option<StatusId>,
    /// Declared inputs of the test.
    pub arguments: Vec<Argument>,
    /// Caller-supplied contextual data outside the test signature.
    pub external_arguments: Vec<Argument>,
    /// Key shared by every historical run of the same logical test.
    pub correlation_id: CorrelationId,
    /// Content hash of `arguments`.
    pub arguments_hash: ArgumentsHash,
    /// Content hash of `external_arguments`.
    pub external_arguments_hash: ArgumentsHash,
}

/// A persisted test context (suite/class grouping node).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestContext {
    /// Row id.
    pub id: ContextId,
    /// Owning launch.
    pub launch_id: LaunchId,
    /// Enclosing context, if any.
    pub parent_test_context_id: Option<ContextId>,
    /// Human-readable title.
    pub title: String,
    /// When the context was created.
    pub created_timestamp: Timestamp,
    /// When the context started.
    pub started_timestamp: Option<Timestamp>,
    /// When the context finished.
    pub finished_timestamp: Option<Timestamp>,
}

/// A row of the unified entity view: a record tagged with its kind.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedEntity {
    /// Table the row came from.
    pub entity_type: EntityKind,
    /// The row itself.
    #[serde(flatten)]
    pub record: TestEntityRecord,
}

/// Input for creating a test entity.
///
/// The three identity fields are optional; missing ones are derived by
/// [`assign_identity`](crate::identity::assign_identity).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestEntity {
    /// Owning launch.
    pub launch_id: LaunchId,
    /// Enclosing context.
    #[serde(default)]
    pub parent_context_id: Option<ContextId>,
    /// Human-readable title.
    pub title: String,
    /// Creation time.
    pub created_timestamp: Timestamp,
    /// Start time.
    #[serde(default)]
    pub started_timestamp: Option<Timestamp>,
    /// Finish time.
    #[serde(default)]
    pub finished_timestamp: Option<Timestamp>,
    /// Reported outcome.
    #[serde(default)]
    pub status_id: Option<StatusId>,
    /// Declared inputs.
    #[serde(default)]
    pub arguments: Vec<Argument>,
    /// Contextual inputs.
    #[serde(default)]
    pub external_arguments: Vec<Argument>,
    /// Explicit correlation key.
    #[serde(default)]
    pub correlation_id: Option<CorrelationId>,
    /// Explicit arguments hash.
    #[serde(default)]
    pub arguments_hash: Option<ArgumentsHash>,
    /// Explicit external arguments hash.
    #[serde(default)]
    pub external_arguments_hash: Option<ArgumentsHash>,
}

impl NewTestEntity {
    /// Minimal input: launch, title, creation time. Everything else empty.
    pub fn new(launch_id: LaunchId, title: impl Into<String>, created: Timestamp) -> Self {
        Self {
            launch_id,
            parent_context_id: None,
            title: title.into(),
            created_timestamp: created,
            started_timestamp: None,
            finished_timestamp: None,
            status_id: None,
            arguments: Vec::new(),
            external_arguments: Vec::new(),
            correlation_id: None,
            arguments_hash: None,
            external_arguments_hash: None,
        }
    }
}

/// Input for creating a test context.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestContext {
    /// Owning launch.
    pub launch_id: LaunchId,
    /// Enclosing context.
    #[serde(default)]
    pub parent_test_context_id: Option<ContextId>,
    /// Human-readable title.
    pub title: String,
    /// Creation time.
    pub created_timestamp: Timestamp,
    /// Start time.
    #[serde(default)]
    pub started_timestamp: Option<Timestamp>,
    /// Finish time.
    #[serde(default)]
    pub finished_timestamp: Option<Timestamp>,
}

impl NewTestContext {
    /// Minimal input: launch, title, creation time.
    pub fn new(launch_id: LaunchId, title: impl Into<String>, created: Timestamp) -> Self {
        Self {
            launch_id,
            parent_test_context_id: None,
            title: title.into(),
            created_timestamp: created,
            started_timestamp: None,
            finished_timestamp: None,
        }
    }
}

/// Partial update of a test entity.
///
/// For nullable columns the outer `Option` means "touch this field" and the
/// inner one is the new value, so `Some(None)` clears the column.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct EntityPatch {
    /// New title.
    pub title: Option<String>,
    /// New creation time.
    pub created_timestamp: Option<Timestamp>,
    /// New start time.
    pub started_timestamp: Option<Option<Timestamp>>,
    /// New finish time.
    pub finished_timestamp: Option<Option<Timestamp>>,
    /// New status.
    pub status_id: Option<Option<StatusId>>,
}

/// Partial update of a test context. Same conventions as [`EntityPatch`].
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ContextPatch {
    /// New title.
    pub title: Option<String>,
    /// New parent.
    pub parent_test_context_id: Option<Option<ContextId>>,
    /// New creation time.
    pub created_timestamp: Option<Timestamp>,
    /// New start time.
    pub started_timestamp: Option<Option<Timestamp>>,
    /// New finish time.
    pub finished_timestamp: Option<Option<Timestamp>>,
}

impl EntityPatch {
    /// Apply to a copy of `row`, returning the merged state.
    pub fn merged(&self, row: &TestEntityRecord) -> TestEntityRecord {
        let mut out = row.clone();
        if let Some(title) = &self.title {
            out.title.clone_from(title);
        }
        if let Some(created) = self.created_timestamp {
            out.created_timestamp = created;
        }
        if let Some(started) = self.started_timestamp {
            out.started_timestamp = started;
        }
        if let Some(finished) = self.finished_timestamp {
            out.finished_timestamp = finished;
        }
        if let Some(status) = self.status_id {
            out.status_id = status;
        }
        out
    }
}

impl ContextPatch {
    /// Apply to a copy of `row`, returning the merged state.
    pub fn merged(&self, row: &TestContext) -> TestContext {
        let mut out = row.clone();
        if let Some(title) = &self.title {
            out.title.clone_from(title);
        }
        if let Some(parent) = self.parent_test_context_id {
            out.parent_test_context_id = parent;
        }
        if let Some(created) = self.created_timestamp {
            out.created_timestamp = created;
        }
        if let Some(started) = self.started_timestamp {
            out.started_timestamp = started;
        }
        if let Some(finished) = self.finished_timestamp {
            out.finished_timestamp = finished;
        }
        out
    }
}
