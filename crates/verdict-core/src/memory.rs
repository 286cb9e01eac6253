// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory entity store.
//!
//! [`MemoryStore`] keeps launches, contexts, and one table per [`EntityKind`]
//! behind a single mutex. Every write validates and then commits while holding
//! that lock, so a parent-chain walk and the insert it guards form one atomic
//! unit: two writers cannot interleave parent assignments that together close
//! a cycle.
//!
//! # Write Invariants
//!
//! - A rejected write leaves the store unchanged.
//! - Identity columns are fixed at creation.
//! - Deleting a launch removes its contexts and entities; deleting a context
//!   removes its descendant contexts and every entity parented under them.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::context_tree::{validate_parent, validate_reparent, ContextTreeError};
use crate::ident::{ContextId, EntityId, EntityKind, LaunchId, StatusId};
use crate::identity::assign_identity;
use crate::model::{
    ContextPatch, EntityPatch, NewTestContext, NewTestEntity, TaggedEntity, TestContext,
    TestEntityRecord,
};
use crate::stats::{statistics, StatisticsRow, StatisticsScope};
use crate::status::{StatusLookup, StatusTaxonomy};
use crate::validate::{
    validate_timestamps, validate_title, ValidationError, DEFAULT_MAX_TITLE_CHARS,
};
use crate::view::{EntityFilter, EntityStore, UnifiedEntityView};

/// Store-level write rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// Title or timestamps are invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The requested parent placement is invalid.
    #[error(transparent)]
    ContextTree(#[from] ContextTreeError),
    /// The owning launch does not exist.
    #[error("[LAUNCH_NOT_FOUND] launch {0} does not exist")]
    LaunchNotFound(LaunchId),
    /// A launch with this id already exists.
    #[error("[LAUNCH_EXISTS] launch {0} already exists")]
    LaunchExists(LaunchId),
    /// The addressed context does not exist.
    #[error("[CONTEXT_NOT_FOUND] test context {0} does not exist")]
    ContextNotFound(ContextId),
    /// The addressed entity does not exist.
    #[error("[ENTITY_NOT_FOUND] {kind} {id} does not exist")]
    EntityNotFound {
        /// Table addressed.
        kind: EntityKind,
        /// Missing id.
        id: EntityId,
    },
    /// The status is not part of the taxonomy.
    #[error("[UNKNOWN_STATUS] status {0} is not defined")]
    UnknownStatus(StatusId),
}

/// Limits and reference data a store validates against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum title length in characters.
    pub max_title_chars: usize,
    /// Status taxonomy used for status checks and statistics.
    pub taxonomy: StatusTaxonomy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
            taxonomy: StatusTaxonomy::default(),
        }
    }
}

/// Row counts removed by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removed {
    /// Contexts removed.
    pub contexts: usize,
    /// Entities removed, across all kinds.
    pub entities: usize,
}

#[derive(Default)]
struct StoreState {
    launches: BTreeSet<LaunchId>,
    contexts: BTreeMap<ContextId, TestContext>,
    entities: [BTreeMap<EntityId, TestEntityRecord>; 3],
    last_context_id: u64,
    last_entity_id: [u64; 3],
}

impl StoreState {
    fn require_launch(&self, id: LaunchId) -> Result<(), RecordError> {
        if self.launches.contains(&id) {
            Ok(())
        } else {
            Err(RecordError::LaunchNotFound(id))
        }
    }

    fn lookup(&self) -> impl FnMut(ContextId) -> Option<TestContext> + '_ {
        move |id| self.contexts.get(&id).cloned()
    }

    fn table(&self, kind: EntityKind) -> &BTreeMap<EntityId, TestEntityRecord> {
        &self.entities[kind.index()]
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<EntityId, TestEntityRecord> {
        &mut self.entities[kind.index()]
    }

    fn create_context(
        &mut self,
        config: &StoreConfig,
        input: NewTestContext,
    ) -> Result<TestContext, RecordError> {
        self.require_launch(input.launch_id)?;
        validate_title(&input.title, config.max_title_chars)?;
        validate_timestamps(
            input.created_timestamp,
            input.started_timestamp,
            input.finished_timestamp,
        )?;
        validate_parent(
            input.launch_id,
            input.parent_test_context_id,
            self.lookup(),
        )?;

        self.last_context_id += 1;
        let context = TestContext {
            id: ContextId(self.last_context_id),
            launch_id: input.launch_id,
            parent_test_context_id: input.parent_test_context_id,
            title: input.title,
            created_timestamp: input.created_timestamp,
            started_timestamp: input.started_timestamp,
            finished_timestamp: input.finished_timestamp,
        };
        self.contexts.insert(context.id, context.clone());
        Ok(context)
    }

    fn patch_context(
        &mut self,
        config: &StoreConfig,
        id: ContextId,
        patch: &ContextPatch,
    ) -> Result<TestContext, RecordError> {
        let existing = self
            .contexts
            .get(&id)
            .ok_or(RecordError::ContextNotFound(id))?;
        let merged = patch.merged(existing);
        validate_title(&merged.title, config.max_title_chars)?;
        validate_timestamps(
            merged.created_timestamp,
            merged.started_timestamp,
            merged.finished_timestamp,
        )?;
        if patch.parent_test_context_id.is_some() {
            validate_reparent(
                id,
                merged.launch_id,
                merged.parent_test_context_id,
                self.lookup(),
            )?;
        }
        self.contexts.insert(id, merged.clone());
        Ok(merged)
    }

    fn delete_context(&mut self, id: ContextId) -> Result<Removed, RecordError> {
        if !self.contexts.contains_key(&id) {
            return Err(RecordError::ContextNotFound(id));
        }
        let mut doomed = BTreeSet::from([id]);
        loop {
            let children: Vec<ContextId> = self
                .contexts
                .values()
                .filter(|c| {
                    !doomed.contains(&c.id)
                        && c.parent_test_context_id
                            .is_some_and(|p| doomed.contains(&p))
                })
                .map(|c| c.id)
                .collect();
            if children.is_empty() {
                break;
            }
            doomed.extend(children);
        }

        let mut removed = Removed::default();
        for context_id in &doomed {
            if self.contexts.remove(context_id).is_some() {
                removed.contexts += 1;
            }
        }
        for table in &mut self.entities {
            let before = table.len();
            table.retain(|_, r| !r.parent_context_id.is_some_and(|p| doomed.contains(&p)));
            removed.entities += before - table.len();
        }
        Ok(removed)
    }

    fn require_status(
        config: &StoreConfig,
        status: Option<StatusId>,
    ) -> Result<(), RecordError> {
        match status {
            Some(s) if config.taxonomy.status_group_of(s).is_none() => {
                Err(RecordError::UnknownStatus(s))
            }
            _ => Ok(()),
        }
    }

    fn create_entity(
        &mut self,
        config: &StoreConfig,
        kind: EntityKind,
        input: NewTestEntity,
    ) -> Result<TestEntityRecord, RecordError> {
        self.require_launch(input.launch_id)?;
        validate_title(&input.title, config.max_title_chars)?;
        validate_timestamps(
            input.created_timestamp,
            input.started_timestamp,
            input.finished_timestamp,
        )?;
        Self::require_status(config, input.status_id)?;
        validate_parent(input.launch_id, input.parent_context_id, self.lookup())?;
        let identity = assign_identity(kind, &input);

        let slot = &mut self.last_entity_id[kind.index()];
        *slot += 1;
        let record = TestEntityRecord {
            id: EntityId(*slot),
            launch_id: input.launch_id,
            parent_context_id: input.parent_context_id,
            title: input.title,
            created_timestamp: input.created_timestamp,
            started_timestamp: input.started_timestamp,
            finished_timestamp: input.finished_timestamp,
            status_id: input.status_id,
            arguments: input.arguments,
            external_arguments: input.external_arguments,
            correlation_id: identity.correlation_id,
            arguments_hash: identity.arguments_hash,
            external_arguments_hash: identity.external_arguments_hash,
        };
        self.table_mut(kind).insert(record.id, record.clone());
        Ok(record)
    }

    fn patch_entity(
        &mut self,
        config: &StoreConfig,
        kind: EntityKind,
        id: EntityId,
        patch: &EntityPatch,
    ) -> Result<TestEntityRecord, RecordError> {
        let existing = self
            .table(kind)
            .get(&id)
            .ok_or(RecordError::EntityNotFound { kind, id })?;
        let merged = patch.merged(existing);
        validate_title(&merged.title, config.max_title_chars)?;
        validate_timestamps(
            merged.created_timestamp,
            merged.started_timestamp,
            merged.finished_timestamp,
        )?;
        Self::require_status(config, merged.status_id)?;
        self.table_mut(kind).insert(id, merged.clone());
        Ok(merged)
    }

    fn list(&self, filter: &EntityFilter) -> Vec<TaggedEntity> {
        EntityKind::ALL
            .into_iter()
            .filter(|kind| filter.admits_kind(*kind))
            .flat_map(move |kind| {
                self.table(kind)
                    .values()
                    .filter(move |r| filter.matches(kind, r))
                    .map(move |r| TaggedEntity {
                        entity_type: kind,
                        record: r.clone(),
                    })
            })
            .collect()
    }
}

fn log_rejection<T>(op: &'static str, result: &Result<T, RecordError>) {
    if let Err(err) = result {
        warn!(op, error = %err, "write rejected");
    }
}

/// Shared, thread-safe in-memory entity store.
///
/// Clones share the same underlying tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreState>>,
    config: Arc<StoreConfig>,
}

impl MemoryStore {
    /// Create an empty store with default limits and taxonomy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store validating against `config`.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: Arc::default(),
            config: Arc::new(config),
        }
    }

    /// Limits and taxonomy in effect.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a launch.
    pub fn create_launch(&self, id: LaunchId) -> Result<(), RecordError> {
        let result = if self.state().launches.insert(id) {
            debug!(launch = %id, "created launch");
            Ok(())
        } else {
            Err(RecordError::LaunchExists(id))
        };
        log_rejection("create_launch", &result);
        result
    }

    /// Returns `true` if the launch is registered.
    pub fn has_launch(&self, id: LaunchId) -> bool {
        self.state().launches.contains(&id)
    }

    /// Delete a launch and everything it owns.
    pub fn delete_launch(&self, id: LaunchId) -> Result<Removed, RecordError> {
        let mut state = self.state();
        if !state.launches.remove(&id) {
            let result = Err(RecordError::LaunchNotFound(id));
            log_rejection("delete_launch", &result);
            return result;
        }
        let before = state.contexts.len();
        state.contexts.retain(|_, c| c.launch_id != id);
        let mut removed = Removed {
            contexts: before - state.contexts.len(),
            entities: 0,
        };
        for table in &mut state.entities {
            let before = table.len();
            table.retain(|_, r| r.launch_id != id);
            removed.entities += before - table.len();
        }
        debug!(launch = %id, contexts = removed.contexts, entities = removed.entities, "deleted launch");
        Ok(removed)
    }

    /// Validate and insert a test context.
    pub fn create_context(&self, input: NewTestContext) -> Result<TestContext, RecordError> {
        let result = self.state().create_context(&self.config, input);
        match &result {
            Ok(c) => debug!(context = %c.id, launch = %c.launch_id, "created test context"),
            Err(_) => log_rejection("create_context", &result),
        }
        result
    }

    /// Apply `patch` to context `id`, validating the merged row.
    pub fn patch_context(
        &self,
        id: ContextId,
        patch: &ContextPatch,
    ) -> Result<TestContext, RecordError> {
        let result = self.state().patch_context(&self.config, id, patch);
        match &result {
            Ok(c) => debug!(context = %c.id, "patched test context"),
            Err(_) => log_rejection("patch_context", &result),
        }
        result
    }

    /// Delete context `id`, its descendants, and the entities under them.
    pub fn delete_context(&self, id: ContextId) -> Result<Removed, RecordError> {
        let result = self.state().delete_context(id);
        match &result {
            Ok(r) => debug!(context = %id, contexts = r.contexts, entities = r.entities, "deleted test context"),
            Err(_) => log_rejection("delete_context", &result),
        }
        result
    }

    /// Validate, assign identity to, and insert a test entity of `kind`.
    pub fn create_entity(
        &self,
        kind: EntityKind,
        input: NewTestEntity,
    ) -> Result<TestEntityRecord, RecordError> {
        let result = self.state().create_entity(&self.config, kind, input);
        match &result {
            Ok(r) => debug!(
                %kind,
                id = %r.id,
                correlation = %r.correlation_id,
                arguments = %r.arguments_hash,
                "created test entity"
            ),
            Err(_) => log_rejection("create_entity", &result),
        }
        result
    }

    /// Apply `patch` to entity `id` of `kind`, validating the merged row.
    pub fn patch_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
        patch: &EntityPatch,
    ) -> Result<TestEntityRecord, RecordError> {
        let result = self.state().patch_entity(&self.config, kind, id, patch);
        match &result {
            Ok(r) => debug!(%kind, id = %r.id, "patched test entity"),
            Err(_) => log_rejection("patch_entity", &result),
        }
        result
    }

    /// Delete one entity.
    pub fn delete_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<TestEntityRecord, RecordError> {
        let result = self
            .state()
            .table_mut(kind)
            .remove(&id)
            .ok_or(RecordError::EntityNotFound { kind, id });
        log_rejection("delete_entity", &result);
        result
    }

    /// Number of stored contexts.
    pub fn context_count(&self) -> usize {
        self.state().contexts.len()
    }

    /// Number of stored entities of `kind`.
    pub fn entity_count(&self, kind: EntityKind) -> usize {
        self.state().table(kind).len()
    }

    /// Status statistics over this store's rows.
    pub fn statistics(&self, scope: StatisticsScope, distinct: bool) -> Vec<StatisticsRow> {
        statistics(self, &self.config.taxonomy, scope, distinct)
    }
}

impl EntityStore for MemoryStore {
    fn find_context_by_id(&self, id: ContextId) -> Option<TestContext> {
        self.state().contexts.get(&id).cloned()
    }

    fn find_test_entity_by_id(&self, kind: EntityKind, id: EntityId) -> Option<TestEntityRecord> {
        self.state().table(kind).get(&id).cloned()
    }
}

impl UnifiedEntityView for MemoryStore {
    fn list_entities(&self, filter: &EntityFilter) -> Vec<TaggedEntity> {
        self.state().list(filter)
    }
}
