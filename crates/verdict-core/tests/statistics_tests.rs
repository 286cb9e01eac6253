// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
use verdict_core::defaults::{
    ABORTED, ABORTED_GROUP, BROKEN, FAILED, FAILURE_GROUP, PASSED, SKIPPED, SUCCESS_GROUP,
};
use verdict_core::{
    total_count, EntityKind, LaunchId, MemoryStore, StatisticsRow, StatisticsScope, StatusGroupId,
    StatusId,
};
use verdict_dry_tests::arguments::sample_pair;
use verdict_dry_tests::{arg, seeded_store, EntityBuilder};

fn all() -> StatisticsScope {
    StatisticsScope::default()
}

fn launch(id: u64) -> StatisticsScope {
    StatisticsScope {
        launch_id: Some(LaunchId(id)),
    }
}

fn add(store: &MemoryStore, kind: EntityKind, builder: EntityBuilder) {
    store.create_entity(kind, builder.build()).unwrap();
}

fn test_row(status: StatusId, group: StatusGroupId, count: u64) -> StatisticsRow {
    StatisticsRow {
        entity_type: EntityKind::Test,
        status_group_id: Some(group),
        status_id: Some(status),
        count,
    }
}

#[test]
fn rerun_after_pass_counts_only_the_abort() {
    let store = seeded_store(&[1]);
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "checkout").finished(100).status(PASSED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "checkout").finished(200).status(ABORTED),
    );

    assert_eq!(
        store.statistics(all(), true),
        vec![StatisticsRow {
            entity_type: EntityKind::Test,
            status_group_id: Some(ABORTED_GROUP),
            status_id: Some(ABORTED),
            count: 1,
        }]
    );
    assert_eq!(total_count(&store.statistics(all(), false)), 2);
}

#[test]
fn five_runs_of_two_tests_collapse_to_two() {
    let store = seeded_store(&[1]);
    for (title, at, status) in [
        ("alpha", 1, FAILED),
        ("beta", 2, PASSED),
        ("alpha", 3, BROKEN),
        ("beta", 4, FAILED),
        ("alpha", 5, PASSED),
    ] {
        add(
            &store,
            EntityKind::Test,
            EntityBuilder::new(1, title).finished(at).status(status),
        );
    }

    assert_eq!(total_count(&store.statistics(all(), false)), 5);
    let distinct = store.statistics(all(), true);
    assert_eq!(total_count(&distinct), 2);
    // alpha ends PASSED, beta ends FAILED.
    assert_eq!(
        distinct,
        vec![
            test_row(PASSED, SUCCESS_GROUP, 1),
            test_row(FAILED, FAILURE_GROUP, 1),
        ]
    );
}

#[test]
fn same_status_reruns_count_once_per_test() {
    let store = seeded_store(&[1]);
    for title in ["alpha", "alpha", "beta", "beta", "beta"] {
        add(
            &store,
            EntityKind::Test,
            EntityBuilder::new(1, title).status(PASSED),
        );
    }
    assert_eq!(
        store.statistics(launch(1), false),
        vec![test_row(PASSED, SUCCESS_GROUP, 5)]
    );
    assert_eq!(
        store.statistics(launch(1), true),
        vec![test_row(PASSED, SUCCESS_GROUP, 2)]
    );
}

#[test]
fn later_finish_wins_regardless_of_insert_order() {
    let store = seeded_store(&[1]);
    // Inserted second but finished first.
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").finished(20).status(FAILED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").finished(10).status(PASSED),
    );
    assert_eq!(
        store.statistics(all(), true),
        vec![test_row(FAILED, FAILURE_GROUP, 1)]
    );
}

#[test]
fn finished_run_outranks_unfinished_one() {
    let store = seeded_store(&[1]);
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").started(5).finished(6).status(PASSED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").created(50).started(60).status(SKIPPED),
    );
    assert_eq!(
        store.statistics(all(), true),
        vec![test_row(PASSED, SUCCESS_GROUP, 1)]
    );
}

#[test]
fn later_start_breaks_a_finish_tie() {
    let store = seeded_store(&[1]);
    // The winner goes in first so a higher id cannot decide.
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").started(50).finished(100).status(PASSED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").started(10).finished(100).status(FAILED),
    );
    assert_eq!(
        store.statistics(all(), true),
        vec![test_row(PASSED, SUCCESS_GROUP, 1)]
    );
}

#[test]
fn later_start_wins_when_neither_run_finished() {
    let store = seeded_store(&[1]);
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").started(50).status(PASSED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").started(10).status(FAILED),
    );
    assert_eq!(
        store.statistics(all(), true),
        vec![test_row(PASSED, SUCCESS_GROUP, 1)]
    );
}

#[test]
fn later_creation_wins_without_start_or_finish() {
    let store = seeded_store(&[1]);
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").created(40).status(PASSED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").created(10).status(FAILED),
    );
    assert_eq!(
        store.statistics(all(), true),
        vec![test_row(PASSED, SUCCESS_GROUP, 1)]
    );
}

#[test]
fn different_arguments_are_different_logical_tests() {
    let store = seeded_store(&[1]);
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "param")
            .arguments(sample_pair())
            .status(PASSED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "param")
            .arguments(vec![arg("Argument1", "String", "other")])
            .status(PASSED),
    );
    assert_eq!(
        store.statistics(all(), true),
        vec![test_row(PASSED, SUCCESS_GROUP, 2)]
    );
}

#[test]
fn external_arguments_do_not_split_logical_tests() {
    let store = seeded_store(&[1]);
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "env")
            .external_arguments(vec![arg("browser", "String", "firefox")])
            .finished(1)
            .status(FAILED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "env")
            .external_arguments(vec![arg("browser", "String", "chrome")])
            .finished(2)
            .status(PASSED),
    );
    assert_eq!(
        store.statistics(all(), true),
        vec![test_row(PASSED, SUCCESS_GROUP, 1)]
    );
}

#[test]
fn fixtures_and_tests_are_counted_separately() {
    let store = seeded_store(&[1]);
    add(
        &store,
        EntityKind::BeforeTest,
        EntityBuilder::new(1, "same").status(PASSED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "same").status(PASSED),
    );
    add(
        &store,
        EntityKind::AfterTest,
        EntityBuilder::new(1, "same").status(PASSED),
    );
    let out = store.statistics(all(), true);
    assert_eq!(out.len(), 3);
    let kinds: Vec<EntityKind> = out.iter().map(|r| r.entity_type).collect();
    assert_eq!(
        kinds,
        vec![EntityKind::BeforeTest, EntityKind::Test, EntityKind::AfterTest]
    );
}

#[test]
fn missing_status_is_its_own_group() {
    let store = seeded_store(&[1]);
    add(&store, EntityKind::Test, EntityBuilder::new(1, "a"));
    add(&store, EntityKind::Test, EntityBuilder::new(1, "b"));
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "c").status(PASSED),
    );
    let out = store.statistics(all(), false);
    assert!(out.contains(&StatisticsRow {
        entity_type: EntityKind::Test,
        status_group_id: None,
        status_id: None,
        count: 2,
    }));
    assert_eq!(total_count(&out), 3);
}

#[test]
fn launch_scope_filters_rows() {
    let store = seeded_store(&[1, 2]);
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").status(PASSED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(2, "t").status(FAILED),
    );
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(2, "u").status(FAILED),
    );

    assert_eq!(
        store.statistics(launch(1), false),
        vec![test_row(PASSED, SUCCESS_GROUP, 1)]
    );
    assert_eq!(
        store.statistics(launch(2), false),
        vec![test_row(FAILED, FAILURE_GROUP, 2)]
    );
    // Across launches the same title is one logical test.
    assert_eq!(total_count(&store.statistics(all(), true)), 2);
}

#[test]
fn unknown_launch_yields_empty_result() {
    let store = seeded_store(&[1]);
    add(
        &store,
        EntityKind::Test,
        EntityBuilder::new(1, "t").status(PASSED),
    );
    assert!(store.statistics(launch(42), false).is_empty());
    assert!(store.statistics(launch(42), true).is_empty());
}

#[test]
fn distinct_never_exceeds_plain_count() {
    let store = seeded_store(&[1]);
    let titles = ["a", "b", "c", "a", "a", "d", "b"];
    for (i, title) in titles.iter().enumerate() {
        let at = i64::try_from(i).unwrap();
        add(
            &store,
            EntityKind::Test,
            EntityBuilder::new(1, title).finished(at).status(PASSED),
        );
    }
    let plain = total_count(&store.statistics(all(), false));
    let distinct = total_count(&store.statistics(all(), true));
    assert_eq!(plain, 7);
    assert_eq!(distinct, 4);

    let unique = seeded_store(&[1]);
    for title in ["a", "b", "c"] {
        add(
            &unique,
            EntityKind::Test,
            EntityBuilder::new(1, title).status(FAILED),
        );
    }
    assert_eq!(
        total_count(&unique.statistics(all(), false)),
        total_count(&unique.statistics(all(), true))
    );
}

#[test]
fn repeated_queries_are_identical() {
    let store = seeded_store(&[1]);
    for (title, status) in [("x", PASSED), ("y", FAILED), ("z", SKIPPED)] {
        add(
            &store,
            EntityKind::Test,
            EntityBuilder::new(1, title).status(status),
        );
    }
    let first = store.statistics(all(), false);
    for _ in 0..3 {
        assert_eq!(store.statistics(all(), false), first);
    }
}
