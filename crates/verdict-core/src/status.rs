// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Two-level status taxonomy: every status belongs to exactly one group.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ident::{StatusGroupId, StatusId};

/// Read access to the status → group mapping.
pub trait StatusLookup {
    /// Group of `status_id`, or `None` for an unknown status.
    fn status_group_of(&self, status_id: StatusId) -> Option<StatusGroupId>;
}

/// A status group (e.g. "failure").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusGroup {
    /// Group id.
    pub id: StatusGroupId,
    /// Display name.
    pub name: String,
}

/// A status (e.g. "BROKEN") and the group it rolls up into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Status id.
    pub id: StatusId,
    /// Display name.
    pub name: String,
    /// Owning group.
    pub group_id: StatusGroupId,
}

/// Rejected taxonomy definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    /// Two groups share an id.
    #[error("[TAXONOMY_DUPLICATE_GROUP] status group {0} defined twice")]
    DuplicateGroup(StatusGroupId),
    /// Two statuses share an id.
    #[error("[TAXONOMY_DUPLICATE_STATUS] status {0} defined twice")]
    DuplicateStatus(StatusId),
    /// A status names a group that is not defined.
    #[error("[TAXONOMY_UNKNOWN_GROUP] status {status} references undefined group {group}")]
    UnknownGroup {
        /// The status.
        status: StatusId,
        /// The missing group.
        group: StatusGroupId,
    },
}

/// Unvalidated, serialized shape of a taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyDef {
    /// Group definitions.
    pub groups: Vec<StatusGroup>,
    /// Status definitions.
    pub statuses: Vec<Status>,
}

/// Validated, indexed status taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxonomyDef", into = "TaxonomyDef")]
pub struct StatusTaxonomy {
    groups: BTreeMap<StatusGroupId, StatusGroup>,
    statuses: BTreeMap<StatusId, Status>,
}

impl StatusTaxonomy {
    /// Build a taxonomy, rejecting duplicate ids and dangling group references.
    pub fn new(groups: Vec<StatusGroup>, statuses: Vec<Status>) -> Result<Self, TaxonomyError> {
        let mut group_index = BTreeMap::new();
        for group in groups {
            let id = group.id;
            if group_index.insert(id, group).is_some() {
                return Err(TaxonomyError::DuplicateGroup(id));
            }
        }
        let mut status_index = BTreeMap::new();
        for status in statuses {
            if !group_index.contains_key(&status.group_id) {
                return Err(TaxonomyError::UnknownGroup {
                    status: status.id,
                    group: status.group_id,
                });
            }
            let id = status.id;
            if status_index.insert(id, status).is_some() {
                return Err(TaxonomyError::DuplicateStatus(id));
            }
        }
        Ok(Self {
            groups: group_index,
            statuses: status_index,
        })
    }

    /// Look up a status definition.
    pub fn status(&self, id: StatusId) -> Option<&Status> {
        self.statuses.get(&id)
    }

    /// Look up a group definition.
    pub fn group(&self, id: StatusGroupId) -> Option<&StatusGroup> {
        self.groups.get(&id)
    }

    /// Find a status by its display name (case-sensitive).
    pub fn status_by_name(&self, name: &str) -> Option<&Status> {
        self.statuses.values().find(|s| s.name == name)
    }

    /// All statuses, ordered by id.
    pub fn statuses(&self) -> impl Iterator<Item = &Status> {
        self.statuses.values()
    }
}

impl StatusLookup for StatusTaxonomy {
    fn status_group_of(&self, status_id: StatusId) -> Option<StatusGroupId> {
        self.statuses.get(&status_id).map(|s| s.group_id)
    }
}

impl TryFrom<TaxonomyDef> for StatusTaxonomy {
    type Error = TaxonomyError;

    fn try_from(def: TaxonomyDef) -> Result<Self, Self::Error> {
        Self::new(def.groups, def.statuses)
    }
}

impl From<StatusTaxonomy> for TaxonomyDef {
    fn from(taxonomy: StatusTaxonomy) -> Self {
        Self {
            groups: taxonomy.groups.into_values().collect(),
            statuses: taxonomy.statuses.into_values().collect(),
        }
    }
}

/// Ids of the built-in taxonomy.
pub mod defaults {
    use crate::ident::{StatusGroupId, StatusId};

    /// Group of passing outcomes.
    pub const SUCCESS_GROUP: StatusGroupId = StatusGroupId(1);
    /// Group of failing outcomes.
    pub const FAILURE_GROUP: StatusGroupId = StatusGroupId(2);
    /// Group of skipped outcomes.
    pub const SKIPPED_GROUP: StatusGroupId = StatusGroupId(3);
    /// Group of interrupted outcomes.
    pub const ABORTED_GROUP: StatusGroupId = StatusGroupId(4);

    /// Test passed.
    pub const PASSED: StatusId = StatusId(1);
    /// Assertion failure.
    pub const FAILED: StatusId = StatusId(2);
    /// Unexpected error outside an assertion.
    pub const BROKEN: StatusId = StatusId(3);
    /// Test was skipped.
    pub const SKIPPED: StatusId = StatusId(4);
    /// Execution was interrupted.
    pub const ABORTED: StatusId = StatusId(5);
}

impl Default for StatusTaxonomy {
    fn default() -> Self {
        use crate::status::defaults::*;
        let group = |id, name: &str| StatusGroup {
            id,
            name: name.to_owned(),
        };
        let status = |id, name: &str, group_id| Status {
            id,
            name: name.to_owned(),
            group_id,
        };
        let groups = vec![
            group(SUCCESS_GROUP, "success"),
            group(FAILURE_GROUP, "failure"),
            group(SKIPPED_GROUP, "skipped"),
            group(ABORTED_GROUP, "aborted"),
        ];
        let statuses = vec![
            status(PASSED, "PASSED", SUCCESS_GROUP),
            status(FAILED, "FAILED", FAILURE_GROUP),
            status(BROKEN, "BROKEN", FAILURE_GROUP),
            status(SKIPPED, "SKIPPED", SKIPPED_GROUP),
            status(ABORTED, "ABORTED", ABORTED_GROUP),
        ];
        let mut taxonomy = Self {
            groups: BTreeMap::new(),
            statuses: BTreeMap::new(),
        };
        for g in groups {
            taxonomy.groups.insert(g.id, g);
        }
        for s in statuses {
            taxonomy.statuses.insert(s.id, s);
        }
        taxonomy
    }
}
