// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Placement checks for the test-context hierarchy.
//!
//! Contexts form a parent-pointer forest persisted in the entity store. Before a
//! row is given a parent, the ancestor chain starting at that parent is walked
//! iteratively through point lookups:
//!
//! 1. every id on the chain must resolve ([`ContextTreeError::ParentNotFound`]);
//! 2. every node must belong to the row's launch
//!    ([`ContextTreeError::ParentBelongsToDifferentLaunch`]);
//! 3. no id may be visited twice ([`ContextTreeError::CircularParentReference`]).
//!
//! The walk keeps no state between calls; the lookup is the sole source of
//! truth. Callers must run the walk and the subsequent write inside one atomic
//! unit against a consistent snapshot.
use std::collections::HashSet;

use crate::ident::{ContextId, LaunchId};
use crate::model::TestContext;

/// Rejection of a proposed parent context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextTreeError {
    /// A context on the ancestor chain does not exist.
    #[error("[PARENT_NOT_FOUND] test context {0} does not exist")]
    ParentNotFound(ContextId),
    /// A context on the ancestor chain belongs to another launch.
    #[error(
        "[PARENT_DIFFERENT_LAUNCH] test context {parent} belongs to launch {found}, expected launch {expected}"
    )]
    ParentBelongsToDifferentLaunch {
        /// The offending context.
        parent: ContextId,
        /// Launch it actually belongs to.
        found: LaunchId,
        /// Launch of the row being placed.
        expected: LaunchId,
    },
    /// The ancestor chain revisits a context.
    #[error("[CIRCULAR_PARENT_REFERENCE] test context {0} appears twice in its ancestor chain")]
    CircularParentReference(ContextId),
}

fn walk<F>(
    launch_id: LaunchId,
    candidate_parent: Option<ContextId>,
    mut visited: HashSet<ContextId>,
    mut lookup: F,
) -> Result<(), ContextTreeError>
where
    F: FnMut(ContextId) -> Option<TestContext>,
{
    let mut current = candidate_parent;
    while let Some(id) = current {
        let found = lookup(id).ok_or(ContextTreeError::ParentNotFound(id))?;
        if found.launch_id != launch_id {
            return Err(ContextTreeError::ParentBelongsToDifferentLaunch {
                parent: id,
                found: found.launch_id,
                expected: launch_id,
            });
        }
        if !visited.insert(id) {
            return Err(ContextTreeError::CircularParentReference(id));
        }
        current = found.parent_test_context_id;
    }
    Ok(())
}

/// Validate `candidate_parent` for a new row in `launch_id`.
///
/// `None` (root-level placement) always succeeds. Used for new contexts and
/// for test entities, which are leaves.
pub fn validate_parent<F>(
    launch_id: LaunchId,
    candidate_parent: Option<ContextId>,
    lookup: F,
) -> Result<(), ContextTreeError>
where
    F: FnMut(ContextId) -> Option<TestContext>,
{
    walk(launch_id, candidate_parent, HashSet::new(), lookup)
}

/// Validate moving existing context `context_id` under `candidate_parent`.
///
/// Rejects self-parenting outright, and treats reaching `context_id` while
/// walking up from the candidate as a cycle: the move would place the context
/// beneath one of its own descendants.
pub fn validate_reparent<F>(
    context_id: ContextId,
    launch_id: LaunchId,
    candidate_parent: Option<ContextId>,
    lookup: F,
) -> Result<(), ContextTreeError>
where
    F: FnMut(ContextId) -> Option<TestContext>,
{
    if candidate_parent == Some(context_id) {
        return Err(ContextTreeError::CircularParentReference(context_id));
    }
    walk(
        launch_id,
        candidate_parent,
        HashSet::from([context_id]),
        lookup,
    )
}
