// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Context-table fake for exercising parent-chain validation directly.

use std::cell::Cell;
use std::collections::HashMap;

use verdict_core::{ContextId, LaunchId, TestContext, Timestamp};

/// Id-indexed context rows plus a lookup counter.
///
/// Rows are inserted verbatim, so tests can seed states the validated store
/// would never produce (cycles, foreign-launch parents, dangling parents).
#[derive(Default)]
pub struct ContextTable {
    rows: HashMap<ContextId, TestContext>,
    lookups: Cell<usize>,
}

impl ContextTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id` in `launch` with optional `parent`, replacing any existing row.
    pub fn with(mut self, id: u64, launch: u64, parent: Option<u64>) -> Self {
        self.insert(id, launch, parent);
        self
    }

    /// Insert or replace a row.
    pub fn insert(&mut self, id: u64, launch: u64, parent: Option<u64>) {
        let row = TestContext {
            id: ContextId(id),
            launch_id: LaunchId(launch),
            parent_test_context_id: parent.map(ContextId),
            title: format!("context-{id}"),
            created_timestamp: Timestamp(0),
            started_timestamp: None,
            finished_timestamp: None,
        };
        self.rows.insert(row.id, row);
    }

    /// Lookup suitable for `validate_parent`; counts every call.
    pub fn lookup(&self) -> impl FnMut(ContextId) -> Option<TestContext> + '_ {
        move |id| {
            self.lookups.set(self.lookups.get() + 1);
            self.rows.get(&id).cloned()
        }
    }

    /// Number of lookups performed so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.get()
    }
}
