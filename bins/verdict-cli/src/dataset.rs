// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON dataset format and ingest through [`MemoryStore`].
//!
//! ```json
//! {
//!   "launches": [1],
//!   "contexts": [{ "launchId": 1, "title": "suite", "createdTimestamp": 0 }],
//!   "entities": [{ "entityType": "test", "launchId": 1, "title": "t", "createdTimestamp": 0 }]
//! }
//! ```
//!
//! Contexts are created in file order, so the n-th context (1-based) gets id
//! `n` and later rows may reference it as a parent.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use verdict_core::{EntityKind, LaunchId, MemoryStore, NewTestContext, NewTestEntity};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Dataset {
    pub launches: Vec<LaunchId>,
    pub contexts: Vec<NewTestContext>,
    pub entities: Vec<DatasetEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DatasetEntity {
    pub entity_type: EntityKind,
    #[serde(flatten)]
    pub input: NewTestEntity,
}

/// Rows accepted by [`Dataset::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ingested {
    pub launches: usize,
    pub contexts: usize,
    pub entities: usize,
}

impl Dataset {
    pub(crate) fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
    }

    /// Write every row into `store`, stopping at the first rejection.
    pub(crate) fn ingest(self, store: &MemoryStore) -> Result<Ingested> {
        for &launch in &self.launches {
            store
                .create_launch(launch)
                .with_context(|| format!("launch {launch}"))?;
        }
        let (launches, contexts, entities) =
            (self.launches.len(), self.contexts.len(), self.entities.len());
        for (n, input) in self.contexts.into_iter().enumerate() {
            let title = input.title.clone();
            store
                .create_context(input)
                .with_context(|| format!("context #{} ({title:?})", n + 1))?;
        }
        for (n, row) in self.entities.into_iter().enumerate() {
            let kind = row.entity_type;
            let title = row.input.title.clone();
            store
                .create_entity(kind, row.input)
                .with_context(|| format!("{kind} #{} ({title:?})", n + 1))?;
        }
        Ok(Ingested {
            launches,
            contexts,
            entities,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use verdict_core::{ContextTreeError, RecordError};

    fn parse(json: &str) -> Dataset {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn entity_kind_sits_beside_flattened_fields() {
        let data = parse(
            r#"{"entities":[{"entityType":"afterTest","launchId":3,"title":"t","createdTimestamp":5,"statusId":1}]}"#,
        );
        assert_eq!(data.entities[0].entity_type, EntityKind::AfterTest);
        assert_eq!(data.entities[0].input.launch_id, LaunchId(3));
        assert!(data.launches.is_empty());
    }

    #[test]
    fn contexts_may_reference_earlier_contexts() {
        let data = parse(
            r#"{
                "launches": [1],
                "contexts": [
                    {"launchId": 1, "title": "root", "createdTimestamp": 0},
                    {"launchId": 1, "title": "child", "createdTimestamp": 0, "parentTestContextId": 1}
                ],
                "entities": [
                    {"entityType": "test", "launchId": 1, "title": "t", "createdTimestamp": 0, "parentContextId": 2}
                ]
            }"#,
        );
        let store = MemoryStore::new();
        assert_eq!(
            data.ingest(&store).unwrap(),
            Ingested {
                launches: 1,
                contexts: 2,
                entities: 1
            }
        );
    }

    #[test]
    fn duplicate_launch_names_the_launch() {
        let data = parse(r#"{"launches": [4, 4]}"#);
        let err = data.ingest(&MemoryStore::new()).unwrap_err();
        assert!(err.to_string().contains("launch 4"));
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::LaunchExists(LaunchId(4)))
        );
    }

    #[test]
    fn forward_parent_reference_is_rejected() {
        let data = parse(
            r#"{
                "launches": [1],
                "contexts": [
                    {"launchId": 1, "title": "early", "createdTimestamp": 0, "parentTestContextId": 2},
                    {"launchId": 1, "title": "late", "createdTimestamp": 0}
                ]
            }"#,
        );
        let err = data.ingest(&MemoryStore::new()).unwrap_err();
        assert!(err.to_string().contains("context #1"));
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::ContextTree(ContextTreeError::ParentNotFound(
                verdict_core::ContextId(2)
            )))
        );
    }
}
