// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for vizport crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`canvas`] - Mock figure canvas with shared probe counters
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`encoder`] - Fake external encoder that records command lines
//! - [`fixtures`] - Element and context builders used across test suites
//! - [`session`] - Fake live-session host and HTML converter

pub mod canvas;
pub mod config;
pub mod encoder;
pub mod fixtures;
pub mod session;

pub use canvas::{CanvasProbe, MockCanvas, MockCanvasFactory};
pub use config::InMemoryConfigStore;
pub use encoder::FakeEncoder;
pub use fixtures::{static_renderer, CountingCallback, RendererHarness};
pub use session::{FakeHtmlConverter, RecordingSessionHost};
