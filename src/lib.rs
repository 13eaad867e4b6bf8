//! EchoMind: headless client for the EchoMind wellness assistant.
//!
//! The crate owns every piece of UI state the assistant front end needs and
//! talks to the EchoMind HTTP API for the actual chat work:
//!
//! - **Chat**: optimistic message send, busy indicator, sources panel,
//!   reflections, conversation clearing and text-to-speech playback
//! - **Auth**: login / signup / logout and the persisted session flag
//! - **Tabs**: the visible content pane, persisted across launches
//! - **Theme**: light/dark appearance, following the OS until the user picks
//! - **Preferences**: language, TTS toggle and sampling temperature
//!
//! # Architecture
//!
//! Controllers are built once by [`App`] and share handles to the API
//! client, the key-value store and the [`EventBus`]. State lives in memory
//! and shells render immutable view snapshots (see [`app::PageView`]).
//! The `echomind-host` binary exposes the same controllers over a
//! newline-delimited JSON protocol on stdin/stdout.

pub mod api;
pub mod app;
pub mod app_dirs;
pub mod busy;
pub mod config;
pub mod controllers;
pub mod error;
pub mod events;
pub mod host;
pub mod i18n;
pub mod speech;
pub mod storage;
pub mod theme;
pub mod transcript;

#[cfg(test)]
pub(crate) mod test_utils;

pub use app::App;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use events::{EventBus, UiEvent};
pub use i18n::Language;
pub use theme::Theme;
