// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Renderer preferences and their storage port.
//! Storage adapters (filesystem, in-memory) live in their own crates.

pub mod config;
pub mod config_port;
pub mod prefs;

pub use config::{ConfigError, ConfigService, ConfigStore};
pub use config_port::PrefsPort;
pub use prefs::{EncoderGap, RendererPrefs, RENDERER_PREFS_KEY};
