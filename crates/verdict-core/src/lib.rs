// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Verdict core: identity, hierarchy, and statistics for test-execution data.
//!
//! Clients report launches, nested test contexts, and before/test/after-test
//! entities. This crate decides what counts as "the same test" across runs,
//! keeps the context hierarchy acyclic and launch-local, and summarizes status
//! distributions.
//!
//! # Identity
//!
//! Every entity carries three content-derived keys, assigned at creation by
//! [`assign_identity`] unless the client supplies them:
//!
//! - `correlationId`: [`derive_correlation_id`] over `(kind, title)`;
//! - `argumentsHash` / `externalArgumentsHash`: [`hash_arguments`] over the
//!   ordered argument lists, with [`ArgumentsHash::NO_ARGUMENTS`] for empty
//!   lists.
//!
//! Two rows are the same logical test when kind, `correlationId`, and
//! `argumentsHash` all match.
//!
//! # Storage
//!
//! [`EntityStore`] and [`UnifiedEntityView`] are the read ports; [`MemoryStore`]
//! implements both together with the validated write path.
#![forbid(unsafe_code)]

pub mod context_tree;
pub mod hash;
pub mod ident;
pub mod identity;
pub mod memory;
pub mod model;
pub mod stats;
pub mod status;
pub mod validate;
pub mod view;

pub use context_tree::{validate_parent, validate_reparent, ContextTreeError};
pub use hash::{hash_arguments, Argument, ArgumentsHash, KeyParseError};
pub use ident::{ContextId, EntityId, EntityKind, LaunchId, StatusGroupId, StatusId, Timestamp};
pub use identity::{assign_identity, derive_correlation_id, CorrelationId, EntityIdentity};
pub use memory::{MemoryStore, RecordError, Removed, StoreConfig};
pub use model::{
    ContextPatch, EntityPatch, NewTestContext, NewTestEntity, TaggedEntity, TestContext,
    TestEntityRecord,
};
pub use stats::{aggregate, statistics, total_count, StatisticsRow, StatisticsScope};
pub use status::{defaults, StatusLookup, StatusTaxonomy, TaxonomyError};
pub use validate::{validate_timestamps, validate_title, ValidationError, DEFAULT_MAX_TITLE_CHARS};
pub use view::{EntityFilter, EntityStore, UnifiedEntityView};
