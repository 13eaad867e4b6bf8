//! Typed notifications passed between controllers and out to shells.

use crate::controllers::tabs::Tab;
use crate::i18n::Language;
use crate::theme::Theme;
use serde_json::json;
use tokio::sync::broadcast;

/// Default event broadcast capacity.
pub const EVENT_CAPACITY: usize = 128;

/// Something observable changed.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Login or signup succeeded (or a stored/server session was restored).
    AuthLogin { username: String },
    /// The session ended.
    AuthLogout,
    /// A different pane is visible.
    TabChanged { tab: Tab },
    ThemeChanged { theme: Theme },
    LanguageChanged { language: Language },
    /// The server switched language; shells should re-render everything.
    ReloadRequested,
    TtsChanged { enabled: bool },
    TemperatureChanged { temperature: f32 },
    /// Busy indicator shown or hidden.
    BusyChanged { visible: bool },
    /// Transcript mutated; `turns` is the new message-turn count.
    TranscriptChanged { turns: usize },
    /// Blocking, user-visible message (auth failures).
    Alert { message: String },
}

impl UiEvent {
    /// Wire name used by the host bridge.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthLogin { .. } => "auth.login",
            Self::AuthLogout => "auth.logout",
            Self::TabChanged { .. } => "tab.changed",
            Self::ThemeChanged { .. } => "theme.changed",
            Self::LanguageChanged { .. } => "language.changed",
            Self::ReloadRequested => "page.reload",
            Self::TtsChanged { .. } => "tts.changed",
            Self::TemperatureChanged { .. } => "temperature.changed",
            Self::BusyChanged { .. } => "busy.changed",
            Self::TranscriptChanged { .. } => "transcript.changed",
            Self::Alert { .. } => "ui.alert",
        }
    }

    /// JSON payload used by the host bridge.
    #[must_use]
    pub fn payload(&self) -> serde_json::Value {
        match self {
            Self::AuthLogin { username } => json!({ "username": username }),
            Self::AuthLogout | Self::ReloadRequested => json!({}),
            Self::TabChanged { tab } => json!({ "tab_id": tab.as_str() }),
            Self::ThemeChanged { theme } => json!({ "theme": theme.as_str() }),
            Self::LanguageChanged { language } => json!({ "language": language.as_str() }),
            Self::TtsChanged { enabled } => json!({ "enabled": enabled }),
            Self::TemperatureChanged { temperature } => json!({ "temperature": temperature }),
            Self::BusyChanged { visible } => json!({ "visible": visible }),
            Self::TranscriptChanged { turns } => json!({ "turns": turns }),
            Self::Alert { message } => json!({ "message": message }),
        }
    }
}

/// Broadcast bus shared by every controller.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CAPACITY)
    }
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: UiEvent) {
        tracing::debug!(event = event.name(), "ui event");
        let _ = self.tx.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }
}
