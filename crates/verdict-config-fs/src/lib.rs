// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem [`ConfigStore`] for Verdict tools.
//!
//! Each key is one `<key>.json` file in a base directory: the platform config
//! dir by default (e.g. `~/.config/Verdict` on Linux), or any directory the
//! caller names. Writes go to a sibling temp file that is then renamed over
//! the target, so readers never observe a half-written blob.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use verdict_app_core::config::{validate_key, ConfigError, ConfigStore};

/// JSON-file config store rooted at one directory.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Root the store at the platform config directory for Verdict.
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("dev", "flyingrobots", "Verdict")
            .ok_or_else(|| ConfigError::Other("no home directory to resolve config dir".into()))?;
        Self::at(dirs.config_dir())
    }

    /// Root the store at `base`, creating the directory if needed.
    pub fn at(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn file(&self, key: &str) -> Result<PathBuf, ConfigError> {
        validate_key(key)?;
        Ok(self.base.join(key).with_extension("json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        fs::read(self.file(key)?).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::Io(err),
        })
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let target = self.file(key)?;
        let staging = target.with_extension("json.tmp");
        let mut file = fs::File::create(&staging)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&staging, &target)?;
        Ok(())
    }
}
