// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Renderer prefs service over a raw document store.

use thiserror::Error;
use tracing::debug;

use crate::prefs::{RendererPrefs, RENDERER_PREFS_KEY};

/// Storage port for raw JSON documents, keyed by logical name.
///
/// Vizport only ever uses [`RENDERER_PREFS_KEY`]; hosts may share the store
/// with their own documents.
pub trait ConfigStore {
    /// Load a raw document. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw document, replacing any previous one.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failure to read or write renderer prefs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No document under the key.
    #[error("no stored renderer prefs")]
    NotFound,
    /// The backing store could not be read or written.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    /// The stored document is not valid prefs JSON.
    #[error("malformed renderer prefs: {0}")]
    Serde(#[from] serde_json::Error),
    /// The store cannot be used at all (no config dir, simulated outage).
    #[error("config store unavailable: {0}")]
    Unavailable(String),
}

/// Reads and writes [`RendererPrefs`] as pretty JSON under
/// [`RENDERER_PREFS_KEY`].
pub struct ConfigService<S> {
    store: S,
}

impl<S: ConfigStore> ConfigService<S> {
    /// Service over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored prefs. A missing or empty document is `Ok(None)`; fields absent
    /// from the document take their defaults.
    pub fn load(&self) -> Result<Option<RendererPrefs>, ConfigError> {
        match self.store.load_raw(RENDERER_PREFS_KEY) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(ConfigError::NotFound) => {
                debug!("no renderer prefs stored");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`load`](Self::load), with defaults when nothing is stored.
    pub fn load_or_default(&self) -> Result<RendererPrefs, ConfigError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Persist `prefs`.
    pub fn save(&self, prefs: &RendererPrefs) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(prefs)?;
        self.store.save_raw(RENDERER_PREFS_KEY, &data)
    }
}
