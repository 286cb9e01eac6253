// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine settings persisted through the config port.

use serde::{Deserialize, Serialize};
use verdict_core::{StatusTaxonomy, StoreConfig, DEFAULT_MAX_TITLE_CHARS};

use crate::config::{ConfigError, ConfigService, ConfigStore};

/// Config key under which [`Settings`] are stored.
pub const SETTINGS_KEY: &str = "settings";

/// Tunables for a Verdict store. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Maximum title length in characters.
    pub max_title_chars: usize,
    /// Status taxonomy.
    pub taxonomy: StatusTaxonomy,
    /// Default `tracing` filter directive for tools (e.g. `info`).
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
            taxonomy: StatusTaxonomy::default(),
            log_filter: "info".to_owned(),
        }
    }
}

impl Settings {
    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_title_chars == 0 {
            return Err(ConfigError::Invalid(
                "maxTitleChars must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Store limits derived from these settings.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_title_chars: self.max_title_chars,
            taxonomy: self.taxonomy.clone(),
        }
    }
}

/// Load settings, falling back to defaults when none are stored.
pub fn load_settings<S>(service: &ConfigService<S>) -> Result<Settings, ConfigError>
where
    S: ConfigStore,
{
    let settings: Settings = service.load_or_default(SETTINGS_KEY)?;
    settings.validate()?;
    Ok(settings)
}

/// Validate and persist settings.
pub fn save_settings<S>(service: &ConfigService<S>, settings: &Settings) -> Result<(), ConfigError>
where
    S: ConfigStore,
{
    settings.validate()?;
    service.save(SETTINGS_KEY, settings)
}
