// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem [`ConfigStore`] for vizport renderer prefs.
//!
//! Each document is one `<key>.json` file in a single directory, by default
//! the platform config dir (e.g. `~/.config/vizport`). Writes go through a
//! sibling temp file and a rename, so a crashed save never leaves a torn
//! prefs file behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tempfile::NamedTempFile;
use vizport_config::{ConfigError, ConfigStore};

/// JSON documents under one directory.
pub struct FsConfigStore {
    dir: PathBuf,
}

impl FsConfigStore {
    /// Store in the user's vizport config directory.
    pub fn for_user() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("dev", "vizport", "vizport").ok_or_else(|| {
            ConfigError::Unavailable("no home directory to place vizport config in".into())
        })?;
        Self::in_dir(dirs.config_dir())
    }

    /// Store in `dir`, created if missing.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        fs::read(self.file(key)).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::Io(err),
        })
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(data)?;
        tmp.persist(self.file(key)).map_err(|err| err.error)?;
        Ok(())
    }
}
