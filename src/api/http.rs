//! `reqwest`-backed [`ApiClient`].
//!
//! Cookies are kept in the client's cookie store, so the server session
//! established by login carries over to every later call.

use super::{ApiClient, AuthReply, AuthStatus, ChatReply, ReflectionReply, paths};
use crate::config::ApiConfig;
use crate::error::{ClientError, Result};
use crate::i18n::Language;
use crate::theme::Theme;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpApiClient {
    /// Build a client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.base_url).map_err(|e| {
            ClientError::Config(format!("invalid api.base_url `{}`: {e}", config.base_url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "api.base_url must be http or https, got `{}`",
                parsed.scheme()
            )));
        }

        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    /// Client for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// See [`HttpApiClient::new`].
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(&ApiConfig {
            base_url: base_url.into(),
            ..ApiConfig::default()
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let request = self.client.post(self.url(path)).json(body);
        self.execute(path, request).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let request = self.client.get(self.url(path));
        self.execute(path, request).await
    }

    async fn execute(&self, path: &str, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "request failed before a response arrived");
            if e.is_timeout() {
                ClientError::Network(format!("{path} timed out"))
            } else {
                ClientError::Network(format!("{path}: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(format!("{path}: failed to read body: {e}")))?;

        let result = decode_body(status.as_u16(), status.is_success(), &body);
        match &result {
            Ok(_) => tracing::debug!(path, status = status.as_u16(), "request succeeded"),
            Err(e) => tracing::warn!(path, status = status.as_u16(), error = %e, "request failed"),
        }
        result
    }
}

/// Turn a status + body into the response JSON or a classified error.
///
/// Non-2xx bodies are mined for an `{error}` string. A 2xx body that is not
/// JSON is a parse error; an empty 2xx body is `null`.
fn decode_body(status: u16, success: bool, body: &str) -> Result<Value> {
    let value = if body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => value,
            Err(e) if success => {
                return Err(ClientError::Parse(format!(
                    "failed to parse server response: {e}"
                )));
            }
            Err(_) => Value::Null,
        }
    };

    if !success {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned);
        return Err(ClientError::Api { status, message });
    }
    Ok(value)
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::Parse(format!("unexpected {path} response: {e}")))
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn send_message(&self, message: &str) -> Result<ChatReply> {
        let value = self
            .post(paths::SEND_MESSAGE, &json!({ "message": message }))
            .await?;
        decode(paths::SEND_MESSAGE, value)
    }

    async fn generate_reflection(&self) -> Result<ReflectionReply> {
        let value = self.post(paths::GENERATE_REFLECTION, &json!({})).await?;
        decode(paths::GENERATE_REFLECTION, value)
    }

    async fn clear_conversation(&self) -> Result<()> {
        self.post(paths::CLEAR_CONVERSATION, &json!({})).await?;
        Ok(())
    }

    async fn set_language(&self, language: Language) -> Result<()> {
        self.post(paths::SET_LANGUAGE, &json!({ "language": language }))
            .await?;
        Ok(())
    }

    async fn set_tts(&self, enabled: bool) -> Result<()> {
        self.post(paths::SET_TTS, &json!({ "enabled": enabled }))
            .await?;
        Ok(())
    }

    async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.post(paths::SET_THEME, &json!({ "theme": theme })).await?;
        Ok(())
    }

    async fn set_temperature(&self, temperature: f32) -> Result<()> {
        self.post(paths::SET_TEMPERATURE, &json!({ "temperature": temperature }))
            .await?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthReply> {
        let value = self
            .post(
                paths::AUTH_LOGIN,
                &json!({ "email": email, "password": password }),
            )
            .await?;
        decode(paths::AUTH_LOGIN, value)
    }

    async fn signup(&self, name: &str, email: &str, password: &str) -> Result<AuthReply> {
        let value = self
            .post(
                paths::AUTH_SIGNUP,
                &json!({ "name": name, "email": email, "password": password }),
            )
            .await?;
        decode(paths::AUTH_SIGNUP, value)
    }

    async fn logout(&self) -> Result<()> {
        self.post(paths::AUTH_LOGOUT, &json!({})).await?;
        Ok(())
    }

    async fn auth_status(&self) -> Result<AuthStatus> {
        let value = self.get(paths::AUTH_STATUS).await?;
        decode(paths::AUTH_STATUS, value)
    }
}
