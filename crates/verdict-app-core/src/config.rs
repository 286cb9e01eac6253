// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config storage port and the JSON service on top of it.
//!
//! Keys are logical names (`settings`, `taxonomy`, ...). Adapters may map them
//! straight onto file names, so [`ConfigService`] only passes keys made of
//! lowercase ASCII letters, digits, `-` and `_`.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Storage port for raw config blobs.
pub trait ConfigStore {
    /// Load the blob stored under `key`. Returns [`ConfigError::NotFound`] when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Store `data` under `key`, replacing any previous blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Config load/save failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing stored under the key.
    #[error("[CONFIG_NOT_FOUND] no config stored under this key")]
    NotFound,
    /// Key contains characters outside `[a-z0-9_-]` or is empty.
    #[error("[CONFIG_INVALID_KEY] {0:?} is not a valid config key")]
    InvalidKey(String),
    /// Reading or writing the backing storage failed.
    #[error("[CONFIG_IO] {0}")]
    Io(#[from] std::io::Error),
    /// The blob is not valid JSON for the requested type.
    #[error("[CONFIG_SERDE] {0}")]
    Serde(#[from] serde_json::Error),
    /// The value parsed but cannot be used.
    #[error("[CONFIG_INVALID] {0}")]
    Invalid(String),
    /// Adapter-specific failure.
    #[error("[CONFIG_OTHER] {0}")]
    Other(String),
}

/// Check that `key` is safe to hand to any [`ConfigStore`].
pub fn validate_key(key: &str) -> Result<(), ConfigError> {
    let ok = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidKey(key.to_owned()))
    }
}

/// Typed JSON access to a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Wrap `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load the value under `key`.
    ///
    /// A missing key or an empty blob is `Ok(None)`; malformed JSON is an error.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        validate_key(key)?;
        let bytes = match self.store.load_raw(key) {
            Ok(bytes) => bytes,
            Err(ConfigError::NotFound) => return Ok(None),
            Err(err) => return Err(err),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Load the value under `key`, or `T::default()` when none is stored.
    pub fn load_or_default<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Store `value` under `key` as pretty-printed JSON with a trailing newline.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize + ?Sized,
    {
        validate_key(key)?;
        let mut data = serde_json::to_vec_pretty(value)?;
        data.push(b'\n');
        self.store.save_raw(key, &data)
    }
}
