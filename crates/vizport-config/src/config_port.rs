// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Best-effort preference port for hosts that should not fail on bad config.

use tracing::warn;

use crate::config::{ConfigService, ConfigStore};
use crate::prefs::RendererPrefs;

/// Loads and saves [`RendererPrefs`] without surfacing storage errors.
pub trait PrefsPort {
    /// Stored preferences, or `None` if missing or unreadable.
    fn load_prefs(&self) -> Option<RendererPrefs>;
    /// Persist preferences; failures are logged.
    fn save_prefs(&self, prefs: &RendererPrefs);
}

impl<S: ConfigStore> PrefsPort for ConfigService<S> {
    fn load_prefs(&self) -> Option<RendererPrefs> {
        match self.load() {
            Ok(prefs) => prefs,
            Err(err) => {
                warn!(%err, "ignoring unreadable renderer prefs");
                None
            }
        }
    }

    fn save_prefs(&self, prefs: &RendererPrefs) {
        if let Err(err) = self.save(prefs) {
            warn!(%err, "failed to persist renderer prefs");
        }
    }
}
