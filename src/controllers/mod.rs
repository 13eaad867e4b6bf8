//! UI controllers.
//!
//! Each controller owns one slice of UI state, persists what it must through
//! the shared [`KeyValueStore`](crate::storage::KeyValueStore), talks to the
//! server through the shared [`ApiClient`](crate::api::ApiClient) and
//! announces changes on the [`EventBus`](crate::events::EventBus).
//! Methods take `&self`; state locks are never held across an `.await`, so
//! overlapping operations are allowed and the last response wins.

pub mod auth;
pub mod chat;
pub mod preferences;
pub mod tabs;
pub mod theme;

pub use auth::AuthController;
pub use chat::ChatController;
pub use preferences::PreferencesController;
pub use tabs::TabController;
pub use theme::ThemeController;
