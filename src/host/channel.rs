//! Host command channel and router for native shell integrations.
//!
//! Commands are dispatched concurrently: a slow `chat.send` never holds up
//! a `tab.switch` sent after it. Every [`UiEvent`](crate::events::UiEvent)
//! published by the controllers is forwarded to subscribers as an
//! [`EventEnvelope`].

use crate::app::App;
use crate::controllers::chat::{ClearOutcome, SendOutcome};
use crate::error::{ClientError, Result};
use crate::host::contract::{CommandEnvelope, CommandName, EventEnvelope, ResponseEnvelope};
use crate::i18n::Language;
use crate::theme::Theme;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};

struct HostCommandRequest {
    envelope: CommandEnvelope,
    response_tx: oneshot::Sender<ResponseEnvelope>,
}

#[derive(Clone)]
pub struct HostCommandClient {
    request_tx: mpsc::Sender<HostCommandRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
}

impl HostCommandClient {
    /// Submit a command and wait for its response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Command`] for an invalid envelope and
    /// [`ClientError::Channel`] if the server has gone away.
    pub async fn send(&self, envelope: CommandEnvelope) -> Result<ResponseEnvelope> {
        envelope.validate().map_err(|e| {
            ClientError::Command(format!(
                "invalid host command envelope {}: {e}",
                envelope.request_id
            ))
        })?;

        let (response_tx, response_rx) = oneshot::channel();
        self.request_tx
            .send(HostCommandRequest {
                envelope,
                response_tx,
            })
            .await
            .map_err(|e| ClientError::Channel(format!("failed to send host command request: {e}")))?;

        response_rx
            .await
            .map_err(|e| ClientError::Channel(format!("host command response dropped: {e}")))
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.event_tx.subscribe()
    }
}

pub struct HostCommandServer {
    request_rx: mpsc::Receiver<HostCommandRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
    app: Arc<App>,
}

#[must_use]
pub fn command_channel(
    request_capacity: usize,
    event_capacity: usize,
    app: Arc<App>,
) -> (HostCommandClient, HostCommandServer) {
    let (request_tx, request_rx) = mpsc::channel(request_capacity.max(1));
    let (event_tx, _event_rx) = broadcast::channel(event_capacity.max(1));

    (
        HostCommandClient {
            request_tx,
            event_tx: event_tx.clone(),
        },
        HostCommandServer {
            request_rx,
            event_tx,
            app,
        },
    )
}

impl HostCommandServer {
    /// Serve until every client handle is dropped.
    ///
    /// UI events still buffered when the last client goes away are
    /// forwarded before returning.
    pub async fn run(mut self) {
        let mut ui_rx = self.app.subscribe();
        let mut events_open = true;

        loop {
            tokio::select! {
                request = self.request_rx.recv() => match request {
                    Some(request) => self.spawn_request(request),
                    None => break,
                },
                event = ui_rx.recv(), if events_open => match event {
                    Ok(event) => self.forward(&event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ui event forwarder lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => events_open = false,
                },
            }
        }

        loop {
            match ui_rx.try_recv() {
                Ok(event) => self.forward(&event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => break,
            }
        }
    }

    fn spawn_request(&self, request: HostCommandRequest) {
        let app = Arc::clone(&self.app);
        tokio::spawn(async move {
            let HostCommandRequest {
                envelope,
                response_tx,
            } = request;
            let response = match route(&app, &envelope).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(
                        request_id = %envelope.request_id,
                        command = envelope.command.as_str(),
                        error = %e,
                        "host command failed"
                    );
                    ResponseEnvelope::error(envelope.request_id.clone(), e.to_string())
                }
            };
            let _ = response_tx.send(response);
        });
    }

    fn forward(&self, event: &crate::events::UiEvent) {
        let _ = self.event_tx.send(EventEnvelope::from_ui_event(event));
    }

    /// Route one command without going through the channel.
    pub async fn route(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        route(&self.app, envelope).await
    }
}

/// Route a command envelope to the controller that owns it.
pub async fn route(app: &App, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
    let id = envelope.request_id.clone();
    let payload = &envelope.payload;

    let response = match envelope.command {
        CommandName::HostPing => json!({"pong": true}),
        CommandName::HostVersion => json!({
            "contract_version": crate::host::contract::EVENT_VERSION,
            "client_version": env!("CARGO_PKG_VERSION"),
        }),
        CommandName::HostSystemTheme => {
            let dark = parse_bool_field(payload, "dark", "host.system_theme")?;
            let changed = app.report_system_theme(Theme::from_dark(dark));
            json!({"changed": changed})
        }
        CommandName::ViewGet => to_payload(&app.view())?,
        CommandName::ChatSend => {
            let text = parse_str_field(payload, "text", "chat.send")?;
            let outcome = app.chat().send_message(text).await;
            json!({"outcome": send_outcome_str(outcome)})
        }
        CommandName::ChatReflect => {
            let ok = app.chat().generate_reflection().await;
            json!({"generated": ok})
        }
        CommandName::ChatClear => {
            let confirmed = payload
                .get("confirmed")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let outcome = app.chat().clear_conversation(&|_: &str| confirmed).await;
            json!({"outcome": clear_outcome_str(outcome)})
        }
        CommandName::ChatToggleSources => {
            app.chat().toggle_sources();
            json!({"expanded": app.chat().view().sources.expanded})
        }
        CommandName::AuthLogin => {
            let email = parse_non_empty_field(payload, "email", "auth.login")?;
            let password = parse_verbatim_field(payload, "password", "auth.login")?;
            let ok = app.auth().login(&email, &password).await;
            json!({"logged_in": ok})
        }
        CommandName::AuthSignup => {
            let name = parse_verbatim_field(payload, "name", "auth.signup")?;
            let email = parse_non_empty_field(payload, "email", "auth.signup")?;
            let password = parse_verbatim_field(payload, "password", "auth.signup")?;
            let ok = app.auth().signup(&name, &email, &password).await;
            json!({"logged_in": ok})
        }
        CommandName::AuthLogout => {
            let ok = app.auth().logout().await;
            json!({"logged_in": app.auth().is_logged_in(), "logged_out": ok})
        }
        CommandName::AuthStatus => {
            let logged_in = app.auth().check_status().await;
            json!({"logged_in": logged_in, "session": to_payload(&app.auth().session())?})
        }
        CommandName::TabSwitch => {
            let tab_id = parse_non_empty_field(payload, "tab_id", "tab.switch")?;
            let switched = app.tabs().switch_tab(&tab_id).is_some();
            json!({"switched": switched, "active": app.tabs().active().as_str()})
        }
        CommandName::ThemeSet => {
            let dark = parse_bool_field(payload, "dark", "theme.set")?;
            app.theme().set_theme(dark).await;
            json!({"theme": app.theme().theme().as_str()})
        }
        CommandName::PrefsLanguage => {
            let language = parse_language(payload)?;
            let ok = app.chat().set_language(language).await;
            json!({"changed": ok, "language": app.prefs().language().as_str()})
        }
        CommandName::PrefsTts => {
            let enabled = parse_bool_field(payload, "enabled", "prefs.tts")?;
            app.prefs().set_tts(enabled).await;
            json!({"enabled": enabled})
        }
        CommandName::PrefsTemperature => {
            let temperature = parse_temperature(payload)?;
            app.prefs().set_temperature(temperature).await;
            json!({"temperature": app.prefs().temperature()})
        }
        CommandName::RuntimeStop => json!({"stopping": true}),
    };

    Ok(ResponseEnvelope::ok(id, response))
}

fn to_payload<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| ClientError::Parse(format!("failed to serialize response payload: {e}")))
}

fn send_outcome_str(outcome: SendOutcome) -> &'static str {
    match outcome {
        SendOutcome::Ignored => "ignored",
        SendOutcome::Replied => "replied",
        SendOutcome::Failed => "failed",
    }
}

fn clear_outcome_str(outcome: ClearOutcome) -> &'static str {
    match outcome {
        ClearOutcome::Declined => "declined",
        ClearOutcome::Cleared => "cleared",
        ClearOutcome::Failed => "failed",
    }
}

fn parse_str_field<'a>(payload: &'a Value, field: &str, command: &str) -> Result<&'a str> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::Command(format!("{command} requires payload.{field}")))
}

fn parse_non_empty_field(payload: &Value, field: &str, command: &str) -> Result<String> {
    let value = parse_str_field(payload, field, command)?.trim();
    if value.is_empty() {
        return Err(ClientError::Command(format!(
            "{command} requires a non-empty payload.{field}"
        )));
    }
    Ok(value.to_owned())
}

/// Like [`parse_non_empty_field`] but keeps surrounding whitespace.
fn parse_verbatim_field(payload: &Value, field: &str, command: &str) -> Result<String> {
    let value = parse_str_field(payload, field, command)?;
    if value.is_empty() {
        return Err(ClientError::Command(format!(
            "{command} requires a non-empty payload.{field}"
        )));
    }
    Ok(value.to_owned())
}

fn parse_bool_field(payload: &Value, field: &str, command: &str) -> Result<bool> {
    payload.get(field).and_then(Value::as_bool).ok_or_else(|| {
        ClientError::Command(format!("{command} requires payload.{field} (boolean)"))
    })
}

fn parse_language(payload: &Value) -> Result<Language> {
    let raw = parse_non_empty_field(payload, "language", "prefs.language")?;
    Language::parse(&raw).ok_or_else(|| {
        ClientError::Command(format!(
            "unsupported language `{raw}` (expected english/arabic/french)"
        ))
    })
}

fn parse_temperature(payload: &Value) -> Result<f32> {
    let Some(raw) = payload.get("temperature").and_then(Value::as_f64) else {
        return Err(ClientError::Command(
            "prefs.temperature requires payload.temperature (number)".to_owned(),
        ));
    };
    Ok(raw as f32)
}
