//! Versioned host command/event envelopes for native shell integration.

use serde::{Deserialize, Serialize};

/// Contract version for host command/event envelopes.
pub const EVENT_VERSION: u32 = 1;

/// Commands a shell can send to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "host.ping")]
    HostPing,
    #[serde(rename = "host.version")]
    HostVersion,
    #[serde(rename = "host.system_theme")]
    HostSystemTheme,
    #[serde(rename = "view.get")]
    ViewGet,
    #[serde(rename = "chat.send")]
    ChatSend,
    #[serde(rename = "chat.reflect")]
    ChatReflect,
    #[serde(rename = "chat.clear")]
    ChatClear,
    #[serde(rename = "chat.toggle_sources")]
    ChatToggleSources,
    #[serde(rename = "auth.login")]
    AuthLogin,
    #[serde(rename = "auth.signup")]
    AuthSignup,
    #[serde(rename = "auth.logout")]
    AuthLogout,
    #[serde(rename = "auth.status")]
    AuthStatus,
    #[serde(rename = "tab.switch")]
    TabSwitch,
    #[serde(rename = "theme.set")]
    ThemeSet,
    #[serde(rename = "prefs.language")]
    PrefsLanguage,
    #[serde(rename = "prefs.tts")]
    PrefsTts,
    #[serde(rename = "prefs.temperature")]
    PrefsTemperature,
    #[serde(rename = "runtime.stop")]
    RuntimeStop,
}

impl CommandName {
    pub const ALL: [CommandName; 18] = [
        Self::HostPing,
        Self::HostVersion,
        Self::HostSystemTheme,
        Self::ViewGet,
        Self::ChatSend,
        Self::ChatReflect,
        Self::ChatClear,
        Self::ChatToggleSources,
        Self::AuthLogin,
        Self::AuthSignup,
        Self::AuthLogout,
        Self::AuthStatus,
        Self::TabSwitch,
        Self::ThemeSet,
        Self::PrefsLanguage,
        Self::PrefsTts,
        Self::PrefsTemperature,
        Self::RuntimeStop,
    ];

    /// Render command name to wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostPing => "host.ping",
            Self::HostVersion => "host.version",
            Self::HostSystemTheme => "host.system_theme",
            Self::ViewGet => "view.get",
            Self::ChatSend => "chat.send",
            Self::ChatReflect => "chat.reflect",
            Self::ChatClear => "chat.clear",
            Self::ChatToggleSources => "chat.toggle_sources",
            Self::AuthLogin => "auth.login",
            Self::AuthSignup => "auth.signup",
            Self::AuthLogout => "auth.logout",
            Self::AuthStatus => "auth.status",
            Self::TabSwitch => "tab.switch",
            Self::ThemeSet => "theme.set",
            Self::PrefsLanguage => "prefs.language",
            Self::PrefsTts => "prefs.tts",
            Self::PrefsTemperature => "prefs.temperature",
            Self::RuntimeStop => "runtime.stop",
        }
    }

    /// Parse a command name from wire format.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

/// A versioned response envelope from client -> shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    pub payload: serde_json::Value,
    pub error: Option<String>,
}

impl ResponseEnvelope {
    #[must_use]
    pub fn ok(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    #[must_use]
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(message.into()),
        }
    }
}

/// A versioned command envelope from shell -> client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: CommandName,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl CommandEnvelope {
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            command,
            payload,
        }
    }

    /// Validate envelope version and required identifiers.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.v != EVENT_VERSION {
            return Err(ContractError::new(
                ContractErrorKind::UnsupportedVersion,
                format!(
                    "unsupported contract version {}; expected {}",
                    self.v, EVENT_VERSION
                ),
            ));
        }
        if self.request_id.trim().is_empty() {
            return Err(ContractError::new(
                ContractErrorKind::InvalidEnvelope,
                "request_id cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// A versioned event envelope from client -> shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub v: u32,
    pub event_id: String,
    pub event: String,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        event: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            event_id: event_id.into(),
            event: event.into(),
            payload,
        }
    }

    /// Wrap a [`UiEvent`](crate::events::UiEvent) with a fresh event id.
    #[must_use]
    pub fn from_ui_event(event: &crate::events::UiEvent) -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            event.name(),
            event.payload(),
        )
    }
}

/// Contract validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    UnsupportedVersion,
    InvalidEnvelope,
}

/// Contract validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    #[must_use]
    pub fn new(kind: ContractErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ContractError {}
