//! Chat pane: message send, sources panel, reflections, clearing and
//! speech playback.

use crate::api::ApiClient;
use crate::busy::BusyIndicator;
use crate::controllers::preferences::PreferencesController;
use crate::error::ClientError;
use crate::events::{EventBus, UiEvent};
use crate::i18n::{Language, UiText};
use crate::speech::{SpeechEngine, Utterance};
use crate::transcript::{Controls, Entry, Role, Transcript};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Asks the user to confirm a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of [`ChatController::send_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Assistant reply appended.
    Replied,
    /// Error bubble appended.
    Failed,
}

/// Result of [`ChatController::clear_conversation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// User said no; no request was made.
    Declined,
    Cleared,
    /// Error bubble appended; transcript kept.
    Failed,
}

/// Citations behind the latest assistant reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourcesPanel {
    pub visible: bool,
    pub expanded: bool,
    pub items: Vec<String>,
}

impl SourcesPanel {
    fn replace(&mut self, sources: &[String]) {
        self.items = sources.iter().map(|s| format!("• {s}")).collect();
        self.visible = !self.items.is_empty();
        if !self.visible {
            self.expanded = false;
        }
    }

    fn hide(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Default)]
struct ChatState {
    transcript: Transcript,
    sources: SourcesPanel,
}

/// Intro card shown while the transcript is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeCard {
    pub title: &'static str,
    pub body: &'static str,
    pub prompt: &'static str,
}

impl WelcomeCard {
    #[must_use]
    pub fn for_language(language: Language) -> Self {
        let text = language.text();
        Self {
            title: text.welcome_title,
            body: text.welcome_body,
            prompt: text.welcome_prompt,
        }
    }
}

/// Sources panel as rendered, with its localized toggle label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcesView {
    pub visible: bool,
    pub expanded: bool,
    pub toggle_label: &'static str,
    pub items: Vec<String>,
}

/// Labels for the chat pane's static controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLabels {
    pub send: &'static str,
    pub reflection: &'static str,
    pub clear: &'static str,
    pub placeholder: &'static str,
    pub thinking: &'static str,
}

impl ChatLabels {
    fn from_text(text: &UiText) -> Self {
        Self {
            send: text.send,
            reflection: text.reflection_button,
            clear: text.clear_button,
            placeholder: text.placeholder,
            thinking: text.thinking,
        }
    }
}

/// Immutable snapshot of the chat pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatView {
    pub entries: Vec<Entry>,
    pub welcome: Option<WelcomeCard>,
    pub sources: SourcesView,
    pub busy: bool,
    pub controls: Controls,
    pub labels: ChatLabels,
    pub reflection_label: &'static str,
}

pub struct ChatController {
    api: Arc<dyn ApiClient>,
    prefs: Arc<PreferencesController>,
    speech: Arc<dyn SpeechEngine>,
    busy: BusyIndicator,
    events: EventBus,
    state: Mutex<ChatState>,
}

impl ChatController {
    pub fn new(
        api: Arc<dyn ApiClient>,
        prefs: Arc<PreferencesController>,
        speech: Arc<dyn SpeechEngine>,
        busy: BusyIndicator,
        events: EventBus,
    ) -> Self {
        Self {
            api,
            prefs,
            speech,
            busy,
            events,
            state: Mutex::new(ChatState::default()),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Mutate the transcript and announce the new turn count.
    fn update_transcript(&self, f: impl FnOnce(&mut ChatState)) {
        let turns = self.with_state(|state| {
            f(state);
            state.transcript.turn_count()
        });
        self.events.publish(UiEvent::TranscriptChanged { turns });
    }

    fn text(&self) -> &'static UiText {
        self.prefs.language().text()
    }

    /// Server `{error}` when present, otherwise the localized fallback.
    fn failure_message(error: &ClientError, fallback: &'static str) -> String {
        error.server_message().unwrap_or(fallback).to_owned()
    }

    /// Append an error bubble.
    pub fn push_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update_transcript(|state| state.transcript.push_error(message));
    }

    /// Send a user message.
    ///
    /// The user turn is appended before the request goes out. Exactly one
    /// assistant turn or one error bubble follows once the request settles.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }

        let _busy = self.busy.begin("send_message");
        self.update_transcript(|state| state.transcript.push_turn(Role::User, message));

        match self.api.send_message(message).await {
            Ok(reply) => {
                let response = reply.response.clone();
                self.update_transcript(|state| {
                    state.transcript.push_turn(Role::Assistant, reply.response);
                    state.sources.replace(&reply.sources);
                });
                tracing::info!(sources = reply.sources.len(), "assistant replied");
                self.speak(&response);
                SendOutcome::Replied
            }
            Err(e) => {
                tracing::error!(error = %e, "error sending message");
                let message = Self::failure_message(&e, self.text().send_error);
                self.push_error(message);
                SendOutcome::Failed
            }
        }
    }

    /// Ask the server for a reflection on the conversation so far and
    /// replace any reflection already shown.
    pub async fn generate_reflection(&self) -> bool {
        let _busy = self.busy.begin("generate_reflection");
        match self.api.generate_reflection().await {
            Ok(reply) => {
                let (replaced, turns) = self.with_state(|state| {
                    let replaced = state.transcript.replace_reflection(reply.reflection);
                    (replaced, state.transcript.turn_count())
                });
                self.events.publish(UiEvent::TranscriptChanged { turns });
                tracing::info!(replaced, "reflection updated");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "error generating reflection");
                let message = Self::failure_message(&e, self.text().reflection_error);
                self.push_error(message);
                false
            }
        }
    }

    /// Clear the conversation after the user confirms.
    pub async fn clear_conversation(&self, confirm: &dyn Confirm) -> ClearOutcome {
        if !confirm.confirm(self.text().clear_confirm) {
            tracing::debug!("clear conversation declined");
            return ClearOutcome::Declined;
        }

        let _busy = self.busy.begin("clear_conversation");
        match self.api.clear_conversation().await {
            Ok(()) => {
                self.update_transcript(|state| {
                    state.transcript.clear();
                    state.sources.hide();
                });
                tracing::info!("conversation cleared");
                ClearOutcome::Cleared
            }
            Err(e) => {
                tracing::error!(error = %e, "error clearing conversation");
                let message = Self::failure_message(&e, self.text().clear_error);
                self.push_error(message);
                ClearOutcome::Failed
            }
        }
    }

    /// Switch the interface language on the server, then locally.
    ///
    /// On failure the old language stays and an error bubble (in the old
    /// language) explains why.
    pub async fn set_language(&self, language: Language) -> bool {
        let _busy = self.busy.begin("set_language");
        match self.api.set_language(language).await {
            Ok(()) => {
                self.prefs.apply_language(language);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, %language, "error changing language");
                let message = Self::failure_message(&e, self.text().language_error);
                self.push_error(message);
                false
            }
        }
    }

    /// Speak `text` in the current UI language when TTS is enabled,
    /// cutting off anything still playing.
    pub fn speak(&self, text: &str) {
        let prefs = self.prefs.snapshot();
        if !prefs.tts_enabled || text.trim().is_empty() {
            return;
        }
        self.speech.cancel();
        let utterance = Utterance {
            text: text.to_owned(),
            locale: prefs.language.speech_locale(),
        };
        if let Err(e) = self.speech.speak(utterance) {
            tracing::warn!(error = %e, "speech playback failed");
        }
    }

    /// Expand or collapse the sources panel.
    pub fn toggle_sources(&self) {
        self.with_state(|state| {
            if state.sources.visible {
                state.sources.expanded = !state.sources.expanded;
            }
        });
    }

    #[must_use]
    pub fn transcript(&self) -> Transcript {
        self.with_state(|state| state.transcript.clone())
    }

    #[must_use]
    pub fn controls(&self) -> Controls {
        self.with_state(|state| state.transcript.controls())
    }

    #[must_use]
    pub fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    #[must_use]
    pub fn view(&self) -> ChatView {
        let language = self.prefs.language();
        let text = language.text();
        let busy = self.busy.is_visible();
        self.with_state(|state| ChatView {
            entries: state.transcript.entries().to_vec(),
            welcome: state
                .transcript
                .is_empty()
                .then(|| WelcomeCard::for_language(language)),
            sources: SourcesView {
                visible: state.sources.visible,
                expanded: state.sources.expanded,
                toggle_label: if state.sources.expanded {
                    text.hide_sources
                } else {
                    text.sources
                },
                items: state.sources.items.clone(),
            },
            busy,
            controls: state.transcript.controls(),
            labels: ChatLabels::from_text(text),
            reflection_label: text.reflection_label,
        })
    }
}
