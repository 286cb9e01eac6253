// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Status-distribution statistics over test entities.
//!
//! Rows are counted per `(entityType, statusId)`, with the status group resolved
//! through the taxonomy. A missing status forms its own group and is never
//! dropped.
//!
//! # Distinct mode
//!
//! Distinct mode first reduces the input to one representative per logical
//! test, keyed by `(entityType, correlationId, argumentsHash)`. The
//! representative is the maximum under [`recency_key`]:
//!
//! 1. latest `finishedTimestamp`, with a present value above a missing one;
//! 2. then latest `startedTimestamp`, same rule;
//! 3. then latest `createdTimestamp`;
//! 4. then highest id.
//!
//! The order is total, so the result does not depend on input order.
//!
//! # Determinism
//!
//! The output is a set. It is returned sorted by `(entityType, statusId)` so
//! repeated calls are byte-identical, but consumers must not rely on position.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::hash::ArgumentsHash;
use crate::ident::{EntityId, EntityKind, LaunchId, StatusGroupId, StatusId, Timestamp};
use crate::identity::CorrelationId;
use crate::model::TaggedEntity;
use crate::status::StatusLookup;
use crate::view::{EntityFilter, UnifiedEntityView};

/// Which rows a statistics query covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatisticsScope {
    /// Restrict to one launch; `None` covers every launch.
    pub launch_id: Option<LaunchId>,
}

/// One output group of a statistics query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRow {
    /// Kind of the counted rows.
    pub entity_type: EntityKind,
    /// Group of `status_id`; `None` when the status is missing or unknown.
    pub status_group_id: Option<StatusGroupId>,
    /// Status of the counted rows; `None` for rows without a status.
    pub status_id: Option<StatusId>,
    /// Number of rows in the group.
    pub count: u64,
}

/// Key identifying one logical test for distinct counting.
pub type LogicalTestKey = (EntityKind, CorrelationId, ArgumentsHash);

/// Ordering key for picking the latest row of a logical test. Larger wins.
pub fn recency_key(
    row: &TaggedEntity,
) -> (Option<Timestamp>, Option<Timestamp>, Timestamp, EntityId) {
    let r = &row.record;
    (
        r.finished_timestamp,
        r.started_timestamp,
        r.created_timestamp,
        r.id,
    )
}

/// Logical-test identity of a row.
pub fn logical_test_key(row: &TaggedEntity) -> LogicalTestKey {
    (
        row.entity_type,
        row.record.correlation_id,
        row.record.arguments_hash,
    )
}

/// Reduce `rows` to the latest row of each logical test.
pub fn select_representatives(rows: &[TaggedEntity]) -> Vec<&TaggedEntity> {
    let mut latest: BTreeMap<LogicalTestKey, &TaggedEntity> = BTreeMap::new();
    for row in rows {
        latest
            .entry(logical_test_key(row))
            .and_modify(|current| {
                if recency_key(row) > recency_key(current) {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    latest.into_values().collect()
}

fn count_by_status<'a, L>(
    rows: impl IntoIterator<Item = &'a TaggedEntity>,
    taxonomy: &L,
) -> Vec<StatisticsRow>
where
    L: StatusLookup + ?Sized,
{
    let mut counts: BTreeMap<(EntityKind, Option<StatusId>), u64> = BTreeMap::new();
    for row in rows {
        *counts
            .entry((row.entity_type, row.record.status_id))
            .or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((entity_type, status_id), count)| StatisticsRow {
            entity_type,
            status_group_id: status_id.and_then(|s| taxonomy.status_group_of(s)),
            status_id,
            count,
        })
        .collect()
}

/// Aggregate an in-memory row set. Pure; never fails.
pub fn aggregate<L>(rows: &[TaggedEntity], taxonomy: &L, distinct: bool) -> Vec<StatisticsRow>
where
    L: StatusLookup + ?Sized,
{
    if distinct {
        count_by_status(select_representatives(rows), taxonomy)
    } else {
        count_by_status(rows, taxonomy)
    }
}

/// Aggregate the rows of `view` covered by `scope`.
///
/// A scope naming a launch with no rows yields an empty result, not an error.
#[instrument(skip(view, taxonomy))]
pub fn statistics<V, L>(
    view: &V,
    taxonomy: &L,
    scope: StatisticsScope,
    distinct: bool,
) -> Vec<StatisticsRow>
where
    V: UnifiedEntityView + ?Sized,
    L: StatusLookup + ?Sized,
{
    let filter = EntityFilter {
        launch_id: scope.launch_id,
        ..EntityFilter::default()
    };
    let rows = view.list_entities(&filter);
    let out = aggregate(&rows, taxonomy, distinct);
    debug!(rows = rows.len(), groups = out.len(), "aggregated statistics");
    out
}

/// Sum of `count` across rows.
pub fn total_count(rows: &[StatisticsRow]) -> u64 {
    rows.iter().map(|r| r.count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{ContextId, LaunchId};
    use crate::identity::derive_correlation_id;
    use crate::model::TestEntityRecord;
    use crate::status::defaults::{ABORTED, ABORTED_GROUP, PASSED, SUCCESS_GROUP};
    use crate::status::StatusTaxonomy;

    fn row(id: u64, title: &str, status: Option<StatusId>) -> TaggedEntity {
        TaggedEntity {
            entity_type: EntityKind::Test,
            record: TestEntityRecord {
                id: EntityId(id),
                launch_id: LaunchId(1),
                parent_context_id: None::<ContextId>,
                title: title.into(),
                created_timestamp: Timestamp(0),
                started_timestamp: None,
                finished_timestamp: None,
                status_id: status,
                arguments: vec![],
                external_arguments: vec![],
                correlation_id: derive_correlation_id(EntityKind::Test, title),
                arguments_hash: ArgumentsHash::NO_ARGUMENTS,
                external_arguments_hash: ArgumentsHash::NO_ARGUMENTS,
            },
        }
    }

    fn finished(mut r: TaggedEntity, at: i64) -> TaggedEntity {
        r.record.finished_timestamp = Some(Timestamp(at));
        r
    }

    #[test]
    fn present_finish_beats_missing_finish() {
        let done = finished(row(1, "t", Some(PASSED)), 5);
        let open = row(2, "t", Some(ABORTED));
        assert!(recency_key(&done) > recency_key(&open));
    }

    #[test]
    fn tie_on_all_timestamps_falls_back_to_id() {
        let rows = vec![row(9, "t", Some(ABORTED)), row(3, "t", Some(PASSED))];
        let picked = select_representatives(&rows);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].record.id, EntityId(9));
    }

    #[test]
    fn selection_ignores_input_order() {
        let a = finished(row(1, "t", Some(PASSED)), 10);
        let b = finished(row(2, "t", Some(ABORTED)), 20);
        let forward = aggregate(&[a.clone(), b.clone()], &StatusTaxonomy::default(), true);
        let backward = aggregate(&[b, a], &StatusTaxonomy::default(), true);
        assert_eq!(forward, backward);
    }

    #[test]
    fn null_status_groups_separately() {
        let rows = vec![row(1, "a", None), row(2, "b", Some(PASSED)), row(3, "c", None)];
        let out = aggregate(&rows, &StatusTaxonomy::default(), false);
        assert_eq!(
            out,
            vec![
                StatisticsRow {
                    entity_type: EntityKind::Test,
                    status_group_id: None,
                    status_id: None,
                    count: 2,
                },
                StatisticsRow {
                    entity_type: EntityKind::Test,
                    status_group_id: Some(SUCCESS_GROUP),
                    status_id: Some(PASSED),
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn unknown_status_keeps_its_id_without_group() {
        let out = aggregate(
            &[row(1, "a", Some(StatusId(77)))],
            &StatusTaxonomy::default(),
            false,
        );
        assert_eq!(out[0].status_id, Some(StatusId(77)));
        assert_eq!(out[0].status_group_id, None);
    }

    #[test]
    fn kinds_are_never_merged() {
        let mut before = row(1, "shared", Some(PASSED));
        before.entity_type = EntityKind::BeforeTest;
        let test = row(1, "shared", Some(PASSED));
        let out = aggregate(&[before, test], &StatusTaxonomy::default(), true);
        assert_eq!(out.len(), 2);
        assert_eq!(total_count(&out), 2);
    }

    #[test]
    fn distinct_reports_latest_status() {
        let early = finished(row(1, "t", Some(PASSED)), 10);
        let late = finished(row(2, "t", Some(ABORTED)), 20);
        let out = aggregate(&[early, late], &StatusTaxonomy::default(), true);
        assert_eq!(
            out,
            vec![StatisticsRow {
                entity_type: EntityKind::Test,
                status_group_id: Some(ABORTED_GROUP),
                status_id: Some(ABORTED),
                count: 1,
            }]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate(&[], &StatusTaxonomy::default(), true).is_empty());
        assert!(aggregate(&[], &StatusTaxonomy::default(), false).is_empty());
    }
}
