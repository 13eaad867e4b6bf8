//! EchoMind HTTP API seam.
//!
//! [`ApiClient`] is the one interface controllers use to reach the server;
//! [`http::HttpApiClient`] is the production implementation.

pub mod http;

use crate::error::Result;
use crate::i18n::Language;
use crate::theme::Theme;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpApiClient;

/// Endpoint paths, relative to the configured base URL.
pub mod paths {
    pub const SEND_MESSAGE: &str = "/api/send_message";
    pub const GENERATE_REFLECTION: &str = "/api/generate_reflection";
    pub const CLEAR_CONVERSATION: &str = "/api/clear_conversation";
    pub const SET_LANGUAGE: &str = "/api/set_language";
    pub const SET_TTS: &str = "/api/set_tts";
    pub const SET_THEME: &str = "/api/set_theme";
    pub const SET_TEMPERATURE: &str = "/api/set_temperature";
    pub const AUTH_LOGIN: &str = "/api/auth/login";
    pub const AUTH_SIGNUP: &str = "/api/auth/signup";
    pub const AUTH_LOGOUT: &str = "/api/auth/logout";
    pub const AUTH_STATUS: &str = "/api/auth/status";
}

/// `/api/send_message` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// `/api/generate_reflection` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionReply {
    pub reflection: String,
}

/// `/api/auth/login` and `/api/auth/signup` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthReply {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub name: String,
}

/// `/api/auth/status` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthStatus {
    #[serde(rename = "isAuthenticated", default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

impl AuthStatus {
    /// Username of an authenticated session.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        if self.is_authenticated {
            self.user.as_ref().map(|u| u.name.as_str())
        } else {
            None
        }
    }
}

/// Every server call the controllers make.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn send_message(&self, message: &str) -> Result<ChatReply>;
    async fn generate_reflection(&self) -> Result<ReflectionReply>;
    async fn clear_conversation(&self) -> Result<()>;
    async fn set_language(&self, language: Language) -> Result<()>;
    async fn set_tts(&self, enabled: bool) -> Result<()>;
    async fn set_theme(&self, theme: Theme) -> Result<()>;
    async fn set_temperature(&self, temperature: f32) -> Result<()>;
    async fn login(&self, email: &str, password: &str) -> Result<AuthReply>;
    async fn signup(&self, name: &str, email: &str, password: &str) -> Result<AuthReply>;
    async fn logout(&self) -> Result<()>;
    async fn auth_status(&self) -> Result<AuthStatus>;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn chat_reply_sources_default_to_empty() {
        let reply: ChatReply = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn auth_status_username_requires_authentication() {
        let status: AuthStatus = serde_json::from_str(
            r#"{"isAuthenticated": false, "user": {"name": "ghost"}}"#,
        )
        .unwrap();
        assert!(status.username().is_none());

        let status: AuthStatus =
            serde_json::from_str(r#"{"isAuthenticated": true, "user": {"name": "Sam"}}"#)
                .unwrap();
        assert_eq!(status.username(), Some("Sam"));
    }
}
