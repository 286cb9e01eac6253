// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Builders for creation inputs and pre-seeded stores.

use verdict_core::{
    Argument, ArgumentsHash, ContextId, CorrelationId, LaunchId, MemoryStore, NewTestContext,
    NewTestEntity, RecordError, StatusId, Timestamp,
};

/// Create a [`MemoryStore`] with the given launches registered.
///
/// Repeated ids are ignored.
///
/// # Panics
///
/// Panics if the store rejects a launch for any reason other than it
/// already existing.
#[allow(clippy::panic)]
pub fn seeded_store(launches: &[u64]) -> MemoryStore {
    let store = MemoryStore::new();
    for &id in launches {
        match store.create_launch(LaunchId(id)) {
            Ok(_) | Err(RecordError::LaunchExists(_)) => {}
            Err(err) => panic!("seeding launch {id}: {err}"),
        }
    }
    store
}

/// Fluent builder for [`NewTestEntity`].
///
/// # Example
///
/// ```
/// use verdict_dry_tests::EntityBuilder;
/// use verdict_core::defaults::PASSED;
///
/// let input = EntityBuilder::new(1, "login works").finished(20).status(PASSED).build();
/// assert_eq!(input.title, "login works");
/// assert!(input.correlation_id.is_none());
/// ```
#[derive(Clone, Debug)]
pub struct EntityBuilder {
    input: NewTestEntity,
}

impl EntityBuilder {
    /// Start from launch `launch`, `title`, created at `0`.
    pub fn new(launch: u64, title: &str) -> Self {
        Self {
            input: NewTestEntity::new(LaunchId(launch), title, Timestamp(0)),
        }
    }

    /// Place under context `id`.
    pub fn parent(mut self, id: ContextId) -> Self {
        self.input.parent_context_id = Some(id);
        self
    }

    /// Set `createdTimestamp`.
    pub fn created(mut self, millis: i64) -> Self {
        self.input.created_timestamp = Timestamp(millis);
        self
    }

    /// Set `startedTimestamp`.
    pub fn started(mut self, millis: i64) -> Self {
        self.input.started_timestamp = Some(Timestamp(millis));
        self
    }

    /// Set `finishedTimestamp`.
    pub fn finished(mut self, millis: i64) -> Self {
        self.input.finished_timestamp = Some(Timestamp(millis));
        self
    }

    /// Set the status.
    pub fn status(mut self, status: StatusId) -> Self {
        self.input.status_id = Some(status);
        self
    }

    /// Set declared arguments.
    pub fn arguments(mut self, args: Vec<Argument>) -> Self {
        self.input.arguments = args;
        self
    }

    /// Set external arguments.
    pub fn external_arguments(mut self, args: Vec<Argument>) -> Self {
        self.input.external_arguments = args;
        self
    }

    /// Supply an explicit correlation id.
    pub fn correlation(mut self, id: CorrelationId) -> Self {
        self.input.correlation_id = Some(id);
        self
    }

    /// Supply an explicit arguments hash.
    pub fn arguments_hash(mut self, hash: ArgumentsHash) -> Self {
        self.input.arguments_hash = Some(hash);
        self
    }

    /// Finish building.
    pub fn build(self) -> NewTestEntity {
        self.input
    }
}

/// Fluent builder for [`NewTestContext`].
#[derive(Clone, Debug)]
pub struct ContextBuilder {
    input: NewTestContext,
}

impl ContextBuilder {
    /// Start from launch `launch`, `title`, created at `0`.
    pub fn new(launch: u64, title: &str) -> Self {
        Self {
            input: NewTestContext::new(LaunchId(launch), title, Timestamp(0)),
        }
    }

    /// Place under context `id`.
    pub fn parent(mut self, id: ContextId) -> Self {
        self.input.parent_test_context_id = Some(id);
        self
    }

    /// Set `startedTimestamp`.
    pub fn started(mut self, millis: i64) -> Self {
        self.input.started_timestamp = Some(Timestamp(millis));
        self
    }

    /// Set `finishedTimestamp`.
    pub fn finished(mut self, millis: i64) -> Self {
        self.input.finished_timestamp = Some(Timestamp(millis));
        self
    }

    /// Finish building.
    pub fn build(self) -> NewTestContext {
        self.input
    }
}
