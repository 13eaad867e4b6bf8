//! Shared test doubles for controller unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::api::{ApiClient, AuthReply, AuthStatus, AuthUser, ChatReply, ReflectionReply};
use crate::error::{ClientError, Result};
use crate::i18n::Language;
use crate::speech::{SpeechEngine, Utterance};
use crate::theme::Theme;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// A failure the mock can be scripted to return.
#[derive(Debug, Clone)]
pub enum MockFailure {
    Network,
    Api { status: u16, message: Option<String> },
    Parse,
}

impl From<MockFailure> for ClientError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::Network => ClientError::Network("connection refused".to_owned()),
            MockFailure::Api { status, message } => ClientError::Api { status, message },
            MockFailure::Parse => ClientError::Parse("failed to parse server response".to_owned()),
        }
    }
}

type Outcome<T> = std::result::Result<T, MockFailure>;

/// Scriptable in-process [`ApiClient`].
///
/// Unscripted calls succeed: chat echoes the message, auth echoes the
/// username, and reflections are numbered.
#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<&'static str>>,
    sent: Mutex<Vec<String>>,
    logins: Mutex<Vec<(String, String)>>,
    send_replies: Mutex<VecDeque<Outcome<ChatReply>>>,
    reflection_replies: Mutex<VecDeque<Outcome<ReflectionReply>>>,
    auth_replies: Mutex<VecDeque<Outcome<AuthReply>>>,
    clear_failure: Mutex<Option<MockFailure>>,
    language_failure: Mutex<Option<MockFailure>>,
    logout_failure: Mutex<Option<MockFailure>>,
    status: Mutex<Option<Outcome<AuthStatus>>>,
    settings_fail: AtomicBool,
    send_gate: Mutex<Option<Arc<Semaphore>>>,
    reflections: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// `(email, password)` of every login, exactly as received.
    pub fn login_attempts(&self) -> Vec<(String, String)> {
        self.logins.lock().unwrap().clone()
    }

    pub fn reply_with(&self, response: &str, sources: &[&str]) {
        self.send_replies.lock().unwrap().push_back(Ok(ChatReply {
            response: response.to_owned(),
            sources: sources.iter().map(|s| (*s).to_owned()).collect(),
        }));
    }

    pub fn fail_next_send(&self, failure: MockFailure) {
        self.send_replies.lock().unwrap().push_back(Err(failure));
    }

    pub fn fail_next_reflection(&self, failure: MockFailure) {
        self.reflection_replies.lock().unwrap().push_back(Err(failure));
    }

    pub fn auth_reply(&self, outcome: Outcome<AuthReply>) {
        self.auth_replies.lock().unwrap().push_back(outcome);
    }

    pub fn fail_clear(&self, failure: MockFailure) {
        *self.clear_failure.lock().unwrap() = Some(failure);
    }

    pub fn fail_language(&self, failure: MockFailure) {
        *self.language_failure.lock().unwrap() = Some(failure);
    }

    pub fn fail_logout(&self, failure: MockFailure) {
        *self.logout_failure.lock().unwrap() = Some(failure);
    }

    pub fn set_status(&self, outcome: Outcome<AuthStatus>) {
        *self.status.lock().unwrap() = Some(outcome);
    }

    /// Make every theme/TTS/temperature sync fail.
    pub fn fail_settings(&self) {
        self.settings_fail.store(true, Ordering::SeqCst);
    }

    /// Hold every `send_message` until a permit is added to the returned
    /// semaphore.
    pub fn gate_sends(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.send_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    fn settings_result(&self) -> Result<()> {
        if self.settings_fail.load(Ordering::SeqCst) {
            Err(MockFailure::Network.into())
        } else {
            Ok(())
        }
    }

    fn scripted_failure(slot: &Mutex<Option<MockFailure>>) -> Result<()> {
        match slot.lock().unwrap().clone() {
            Some(failure) => Err(failure.into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn send_message(&self, message: &str) -> Result<ChatReply> {
        self.record("send_message");
        self.sent.lock().unwrap().push(message.to_owned());
        let gate = self.send_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        let scripted = self.send_replies.lock().unwrap().pop_front();
        match scripted {
            Some(outcome) => outcome.map_err(Into::into),
            None => Ok(ChatReply {
                response: format!("echo: {message}"),
                sources: Vec::new(),
            }),
        }
    }

    async fn generate_reflection(&self) -> Result<ReflectionReply> {
        self.record("generate_reflection");
        let scripted = self.reflection_replies.lock().unwrap().pop_front();
        match scripted {
            Some(outcome) => outcome.map_err(Into::into),
            None => {
                let n = self.reflections.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(ReflectionReply {
                    reflection: format!("Reflection #{n}"),
                })
            }
        }
    }

    async fn clear_conversation(&self) -> Result<()> {
        self.record("clear_conversation");
        Self::scripted_failure(&self.clear_failure)
    }

    async fn set_language(&self, _language: Language) -> Result<()> {
        self.record("set_language");
        Self::scripted_failure(&self.language_failure)
    }

    async fn set_tts(&self, _enabled: bool) -> Result<()> {
        self.record("set_tts");
        self.settings_result()
    }

    async fn set_theme(&self, _theme: Theme) -> Result<()> {
        self.record("set_theme");
        self.settings_result()
    }

    async fn set_temperature(&self, _temperature: f32) -> Result<()> {
        self.record("set_temperature");
        self.settings_result()
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthReply> {
        self.record("login");
        self.logins
            .lock()
            .unwrap()
            .push((email.to_owned(), password.to_owned()));
        let scripted = self.auth_replies.lock().unwrap().pop_front();
        match scripted {
            Some(outcome) => outcome.map_err(Into::into),
            None => Ok(AuthReply {
                username: email.split('@').next().unwrap_or(email).to_owned(),
            }),
        }
    }

    async fn signup(&self, name: &str, _email: &str, _password: &str) -> Result<AuthReply> {
        self.record("signup");
        let scripted = self.auth_replies.lock().unwrap().pop_front();
        match scripted {
            Some(outcome) => outcome.map_err(Into::into),
            None => Ok(AuthReply {
                username: name.to_owned(),
            }),
        }
    }

    async fn logout(&self) -> Result<()> {
        self.record("logout");
        Self::scripted_failure(&self.logout_failure)
    }

    async fn auth_status(&self) -> Result<AuthStatus> {
        self.record("auth_status");
        match self.status.lock().unwrap().clone() {
            Some(outcome) => outcome.map_err(Into::into),
            None => Ok(AuthStatus::default()),
        }
    }
}

/// Authenticated status body for `name`.
pub fn authenticated(name: &str) -> AuthStatus {
    AuthStatus {
        is_authenticated: true,
        user: Some(AuthUser {
            name: name.to_owned(),
        }),
    }
}

/// Speech engine that records instead of speaking.
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<Utterance>>,
    cancels: AtomicUsize,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl SpeechEngine for RecordingSpeech {
    fn speak(&self, utterance: Utterance) -> Result<()> {
        self.spoken.lock().unwrap().push(utterance);
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}
