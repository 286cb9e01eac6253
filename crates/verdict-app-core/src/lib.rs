// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for Verdict tools (config port, settings).
//! Keeps storage adapters and binaries thin.

pub mod config;
pub mod settings;

pub use config::{validate_key, ConfigError, ConfigService, ConfigStore};
pub use settings::{load_settings, save_settings, Settings, SETTINGS_KEY};
