// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Verdict crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`arguments`] - Terse argument-list construction
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`contexts`] - Context-table fake for parent-chain validation tests
//! - [`fixtures`] - Builders for entity/context inputs and seeded stores

pub mod arguments;
pub mod config;
pub mod contexts;
pub mod fixtures;

// Re-export commonly used items at crate root for convenience
pub use arguments::{arg, null_arg};
pub use config::InMemoryConfigStore;
pub use contexts::ContextTable;
pub use fixtures::{seeded_store, ContextBuilder, EntityBuilder};
