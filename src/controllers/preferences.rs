//! Language, text-to-speech and temperature preferences.
//!
//! Each preference is independent: it is applied and persisted locally
//! first, then mirrored to the server on a best-effort basis.

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::events::{EventBus, UiEvent};
use crate::i18n::Language;
use crate::speech::SpeechEngine;
use crate::storage::{KeyValueStore, keys, store_bool_or_warn, store_or_warn};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Snapshot of the user-tunable preferences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreferenceSet {
    pub language: Language,
    pub tts_enabled: bool,
    pub temperature: f32,
}

pub struct PreferencesController {
    api: Arc<dyn ApiClient>,
    store: Arc<dyn KeyValueStore>,
    speech: Arc<dyn SpeechEngine>,
    events: EventBus,
    state: Mutex<PreferenceSet>,
}

impl PreferencesController {
    /// Load stored preferences, falling back to `config` defaults.
    pub fn new(
        config: &ClientConfig,
        api: Arc<dyn ApiClient>,
        store: Arc<dyn KeyValueStore>,
        speech: Arc<dyn SpeechEngine>,
        events: EventBus,
    ) -> Self {
        let language = store
            .get(keys::LANGUAGE)
            .and_then(|raw| Language::parse(&raw))
            .unwrap_or(config.ui.default_language);
        let tts_enabled = store
            .get_bool(keys::TTS_ENABLED)
            .unwrap_or(config.speech.enabled_by_default);
        let temperature = store
            .get(keys::TEMPERATURE)
            .and_then(|raw| raw.parse::<f32>().ok())
            .filter(|t| t.is_finite())
            .map_or(config.ui.default_temperature, clamp_temperature);

        Self {
            api,
            store,
            speech,
            events,
            state: Mutex::new(PreferenceSet {
                language,
                tts_enabled,
                temperature,
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> PreferenceSet {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.snapshot().language
    }

    #[must_use]
    pub fn tts_enabled(&self) -> bool {
        self.snapshot().tts_enabled
    }

    #[must_use]
    pub fn temperature(&self) -> f32 {
        self.snapshot().temperature
    }

    /// Apply a language the server has already accepted.
    ///
    /// Persists it and announces both the change and the full re-render
    /// the server switch implies.
    pub fn apply_language(&self, language: Language) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).language = language;
        store_or_warn(self.store.as_ref(), keys::LANGUAGE, language.as_str());
        self.events.publish(UiEvent::LanguageChanged { language });
        self.events.publish(UiEvent::ReloadRequested);
    }

    /// Enable or disable speech playback. Disabling stops any utterance
    /// in flight.
    pub async fn set_tts(&self, enabled: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).tts_enabled = enabled;
        store_bool_or_warn(self.store.as_ref(), keys::TTS_ENABLED, enabled);
        if !enabled {
            self.speech.cancel();
        }
        self.events.publish(UiEvent::TtsChanged { enabled });

        if let Err(e) = self.api.set_tts(enabled).await {
            tracing::warn!(error = %e, enabled, "failed to sync TTS setting to server");
        }
    }

    /// Set the sampling temperature, clamped to `[0, 1]`.
    /// Non-finite input is ignored.
    pub async fn set_temperature(&self, temperature: f32) {
        if !temperature.is_finite() {
            tracing::warn!(temperature, "ignoring non-finite temperature");
            return;
        }
        let temperature = clamp_temperature(temperature);
        self.state.lock().unwrap_or_else(|e| e.into_inner()).temperature = temperature;
        store_or_warn(
            self.store.as_ref(),
            keys::TEMPERATURE,
            &temperature.to_string(),
        );
        self.events
            .publish(UiEvent::TemperatureChanged { temperature });

        if let Err(e) = self.api.set_temperature(temperature).await {
            tracing::warn!(error = %e, temperature, "failed to sync temperature to server");
        }
    }
}

fn clamp_temperature(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}
