// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read ports onto persisted rows: point lookups and the unified entity view.
//!
//! # Absence Semantics
//!
//! Lookups return `None` for missing rows and listings return an empty vector
//! for filters that match nothing. Neither is an error.
use serde::{Deserialize, Serialize};

use crate::hash::ArgumentsHash;
use crate::ident::{ContextId, EntityId, EntityKind, LaunchId, StatusId};
use crate::identity::CorrelationId;
use crate::model::{TaggedEntity, TestContext, TestEntityRecord};

/// Point lookups into the entity store.
pub trait EntityStore {
    /// Fetch a test context by id.
    fn find_context_by_id(&self, id: ContextId) -> Option<TestContext>;

    /// Fetch a before/test/after-test row by kind and id.
    fn find_test_entity_by_id(&self, kind: EntityKind, id: EntityId) -> Option<TestEntityRecord>;
}

/// Read-only union of the three entity tables, tagged with `entityType`.
///
/// Derived on every call; implementations must not cache results across
/// writes.
pub trait UnifiedEntityView {
    /// All rows matching `filter`, in kind order then id order.
    fn list_entities(&self, filter: &EntityFilter) -> Vec<TaggedEntity>;
}

/// Conjunctive filter over the unified view. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityFilter {
    /// Restrict to one launch.
    pub launch_id: Option<LaunchId>,
    /// Restrict to direct children of one context.
    pub parent_context_id: Option<ContextId>,
    /// Restrict to these kinds.
    pub entity_types: Option<Vec<EntityKind>>,
    /// Restrict to one logical test.
    pub correlation_id: Option<CorrelationId>,
    /// Restrict to one argument set.
    pub arguments_hash: Option<ArgumentsHash>,
    /// Restrict to one status.
    pub status_id: Option<StatusId>,
}

impl EntityFilter {
    /// Filter on a single launch.
    pub fn for_launch(launch_id: LaunchId) -> Self {
        Self {
            launch_id: Some(launch_id),
            ..Self::default()
        }
    }

    /// Whether rows of `kind` can match at all.
    pub fn admits_kind(&self, kind: EntityKind) -> bool {
        self.entity_types
            .as_ref()
            .is_none_or(|kinds| kinds.contains(&kind))
    }

    /// Whether `record` of `kind` matches every set field.
    pub fn matches(&self, kind: EntityKind, record: &TestEntityRecord) -> bool {
        self.admits_kind(kind)
            && self.launch_id.is_none_or(|id| record.launch_id == id)
            && self
                .parent_context_id
                .is_none_or(|id| record.parent_context_id == Some(id))
            && self
                .correlation_id
                .is_none_or(|id| record.correlation_id == id)
            && self
                .arguments_hash
                .is_none_or(|h| record.arguments_hash == h)
            && self.status_id.is_none_or(|s| record.status_id == Some(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Timestamp;
    use crate::identity::derive_correlation_id;

    fn record() -> TestEntityRecord {
        TestEntityRecord {
            id: EntityId(1),
            launch_id: LaunchId(1),
            parent_context_id: Some(ContextId(2)),
            title: "t".into(),
            created_timestamp: Timestamp(0),
            started_timestamp: None,
            finished_timestamp: None,
            status_id: None,
            arguments: vec![],
            external_arguments: vec![],
            correlation_id: derive_correlation_id(EntityKind::Test, "t"),
            arguments_hash: ArgumentsHash::NO_ARGUMENTS,
            external_arguments_hash: ArgumentsHash::NO_ARGUMENTS,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(EntityFilter::default().matches(EntityKind::AfterTest, &record()));
    }

    #[test]
    fn each_field_narrows() {
        let r = record();
        assert!(EntityFilter::for_launch(LaunchId(1)).matches(EntityKind::Test, &r));
        assert!(!EntityFilter::for_launch(LaunchId(2)).matches(EntityKind::Test, &r));

        let kinds = EntityFilter {
            entity_types: Some(vec![EntityKind::BeforeTest]),
            ..EntityFilter::default()
        };
        assert!(!kinds.matches(EntityKind::Test, &r));
        assert!(kinds.matches(EntityKind::BeforeTest, &r));

        let parent = EntityFilter {
            parent_context_id: Some(ContextId(3)),
            ..EntityFilter::default()
        };
        assert!(!parent.matches(EntityKind::Test, &r));

        let status = EntityFilter {
            status_id: Some(StatusId(1)),
            ..EntityFilter::default()
        };
        assert!(!status.matches(EntityKind::Test, &r));
    }
}
