//! Composition root: builds the controllers once and projects the page.

use crate::api::{ApiClient, HttpApiClient};
use crate::busy::BusyIndicator;
use crate::config::ClientConfig;
use crate::controllers::auth::HeaderView;
use crate::controllers::chat::ChatView;
use crate::controllers::tabs::TabsView;
use crate::controllers::{
    AuthController, ChatController, PreferencesController, TabController, ThemeController,
};
use crate::error::Result;
use crate::events::{EventBus, UiEvent};
use crate::i18n::Language;
use crate::speech::{NullSpeech, SpeechEngine, SystemSpeech};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::theme::Theme;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Everything a shell needs to draw the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub theme: Theme,
    pub language: Language,
    /// Right-to-left layout (Arabic).
    pub rtl: bool,
    pub tts_enabled: bool,
    pub temperature: f32,
    pub header: HeaderView,
    pub tabs: TabsView,
    pub chat: ChatView,
}

pub struct App {
    events: EventBus,
    prefs: Arc<PreferencesController>,
    chat: Arc<ChatController>,
    auth: Arc<AuthController>,
    tabs: Arc<TabController>,
    theme: Arc<ThemeController>,
    /// Latest known OS appearance, consumed by the theme follower.
    system_theme: Arc<watch::Sender<Theme>>,
    theme_follower: Mutex<Option<JoinHandle<()>>>,
}

impl App {
    /// Wire the controllers around explicit collaborators.
    pub fn new(
        config: &ClientConfig,
        api: Arc<dyn ApiClient>,
        store: Arc<dyn KeyValueStore>,
        speech: Arc<dyn SpeechEngine>,
        system_theme: Theme,
    ) -> Self {
        let events = EventBus::default();
        let prefs = Arc::new(PreferencesController::new(
            config,
            Arc::clone(&api),
            Arc::clone(&store),
            Arc::clone(&speech),
            events.clone(),
        ));
        let busy = BusyIndicator::new(config.ui.busy_failsafe(), events.clone());
        let chat = Arc::new(ChatController::new(
            Arc::clone(&api),
            Arc::clone(&prefs),
            speech,
            busy,
            events.clone(),
        ));
        let auth = Arc::new(AuthController::new(
            Arc::clone(&api),
            Arc::clone(&store),
            Arc::clone(&prefs),
            events.clone(),
        ));
        let tabs = Arc::new(TabController::new(
            Arc::clone(&store),
            Arc::clone(&prefs),
            events.clone(),
        ));
        let theme = Arc::new(ThemeController::new(api, store, events.clone(), system_theme));
        let (system_theme, _) = watch::channel(system_theme);

        Self {
            events,
            prefs,
            chat,
            auth,
            tabs,
            theme,
            system_theme: Arc::new(system_theme),
            theme_follower: Mutex::new(None),
        }
    }

    /// Build the production collaborators described by `config`.
    ///
    /// # Errors
    ///
    /// Fails if the API base URL is invalid or the storage file exists but
    /// cannot be read.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let api: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(&config.api)?);

        let store: Arc<dyn KeyValueStore> = if config.storage.ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FileStore::open(config.storage.resolved_path())?)
        };

        let speech: Arc<dyn SpeechEngine> =
            match SystemSpeech::detect(config.speech.program.as_deref()) {
                Some(engine) => Arc::new(engine),
                None => {
                    tracing::info!("no speech synthesizer found, speech disabled");
                    Arc::new(NullSpeech)
                }
            };

        Ok(Self::new(config, api, store, speech, Theme::system()))
    }

    /// Load-time sequence: stored session, stored tab, then the server's
    /// view of the session. Also starts following OS appearance updates.
    pub async fn start(&self) {
        self.auth.restore();
        self.tabs.restore();
        self.follow_system_theme();
        self.auth.check_status().await;
        tracing::info!(
            logged_in = self.auth.is_logged_in(),
            tab = %self.tabs.active(),
            theme = %self.theme.theme(),
            "client started"
        );
    }

    fn follow_system_theme(&self) {
        let mut follower = self
            .theme_follower
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if follower.is_none() {
            *follower = Some(self.theme.follow_system(self.system_theme.subscribe()));
        }
    }

    /// Record the OS appearance. The theme follower applies it (and
    /// publishes `ThemeChanged`) unless the user already chose a theme.
    /// Returns whether the recorded value changed.
    pub fn report_system_theme(&self, theme: Theme) -> bool {
        self.system_theme.send_if_modified(|current| {
            if *current == theme {
                false
            } else {
                *current = theme;
                true
            }
        })
    }

    /// Sample `detect` every `every` and report changes. The task ends once
    /// the `App` is dropped.
    pub fn poll_system_theme<F>(&self, every: Duration, detect: F) -> JoinHandle<()>
    where
        F: Fn() -> Theme + Send + 'static,
    {
        let sender = Arc::downgrade(&self.system_theme);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(sender) = sender.upgrade() else {
                    break;
                };
                let theme = detect();
                sender.send_if_modified(|current| {
                    if *current == theme {
                        false
                    } else {
                        tracing::debug!(%theme, "system appearance changed");
                        *current = theme;
                        true
                    }
                });
            }
        })
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn chat(&self) -> &Arc<ChatController> {
        &self.chat
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<AuthController> {
        &self.auth
    }

    #[must_use]
    pub fn tabs(&self) -> &Arc<TabController> {
        &self.tabs
    }

    #[must_use]
    pub fn theme(&self) -> &Arc<ThemeController> {
        &self.theme
    }

    #[must_use]
    pub fn prefs(&self) -> &Arc<PreferencesController> {
        &self.prefs
    }

    #[must_use]
    pub fn view(&self) -> PageView {
        let prefs = self.prefs.snapshot();
        PageView {
            theme: self.theme.theme(),
            language: prefs.language,
            rtl: prefs.language.is_rtl(),
            tts_enabled: prefs.tts_enabled,
            temperature: prefs.temperature,
            header: self.auth.header(),
            tabs: self.tabs.view(),
            chat: self.chat.view(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::controllers::tabs::Tab;
    use crate::storage::keys;
    use crate::test_utils::{MockApi, RecordingSpeech, authenticated};

    fn app(api: Arc<MockApi>, store: Arc<MemoryStore>) -> App {
        App::new(
            &ClientConfig::default(),
            api,
            store,
            Arc::new(RecordingSpeech::default()),
            Theme::Light,
        )
    }

    #[tokio::test]
    async fn start_restores_session_and_tab() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::IS_LOGGED_IN, "true").unwrap();
        store.set(keys::CURRENT_USER, "amira").unwrap();
        store.set(keys::ACTIVE_TAB, "resources").unwrap();
        let api = Arc::new(MockApi::new());
        api.set_status(Ok(authenticated("amira")));

        let app = app(Arc::clone(&api), store);
        app.start().await;

        let view = app.view();
        assert_eq!(view.tabs.active, Tab::Resources);
        assert_eq!(
            view.header.profile.map(|p| p.username).as_deref(),
            Some("amira")
        );
        assert_eq!(api.call_count("auth_status"), 1);
    }

    #[tokio::test]
    async fn arabic_page_is_rtl() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::LANGUAGE, "arabic").unwrap();
        let app = app(Arc::new(MockApi::new()), store);
        let view = app.view();
        assert!(view.rtl);
        assert_eq!(view.chat.labels.send, "إرسال");
    }

    #[tokio::test]
    async fn page_view_serializes() {
        let app = app(Arc::new(MockApi::new()), Arc::new(MemoryStore::new()));
        app.chat().send_message("hello").await;
        let json = serde_json::to_value(app.view()).unwrap();
        assert_eq!(json["theme"], "light");
        assert_eq!(json["language"], "english");
        assert_eq!(json["chat"]["entries"][0]["kind"], "message");
        assert_eq!(json["tabs"]["active"], "chat");
    }

    async fn next_theme_change(rx: &mut broadcast::Receiver<UiEvent>) -> Theme {
        loop {
            if let UiEvent::ThemeChanged { theme } = rx.recv().await.unwrap() {
                return theme;
            }
        }
    }

    #[tokio::test]
    async fn started_app_follows_os_until_explicit_choice() {
        let app = app(Arc::new(MockApi::new()), Arc::new(MemoryStore::new()));
        let mut rx = app.subscribe();
        app.start().await;

        assert!(app.report_system_theme(Theme::Dark));
        let theme = tokio::time::timeout(Duration::from_secs(5), next_theme_change(&mut rx))
            .await
            .expect("theme follower applied the OS change");
        assert_eq!(theme, Theme::Dark);
        assert_eq!(app.view().theme, Theme::Dark);

        app.theme().set_theme(false).await;
        assert!(app.report_system_theme(Theme::Light));
        assert!(app.report_system_theme(Theme::Dark));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(app.view().theme, Theme::Light);
    }

    #[tokio::test]
    async fn repeated_report_is_not_a_change() {
        let app = app(Arc::new(MockApi::new()), Arc::new(MemoryStore::new()));
        assert!(!app.report_system_theme(Theme::Light));
        assert!(app.report_system_theme(Theme::Dark));
        assert!(!app.report_system_theme(Theme::Dark));
    }

    #[tokio::test(start_paused = true)]
    async fn polling_picks_up_os_appearance_changes() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let app = app(Arc::new(MockApi::new()), Arc::new(MemoryStore::new()));
        let mut rx = app.subscribe();
        app.start().await;

        let os_dark = Arc::new(AtomicBool::new(false));
        let detect_dark = Arc::clone(&os_dark);
        let poller = app.poll_system_theme(Duration::from_secs(5), move || {
            Theme::from_dark(detect_dark.load(Ordering::SeqCst))
        });

        os_dark.store(true, Ordering::SeqCst);
        let theme = tokio::time::timeout(Duration::from_secs(30), next_theme_change(&mut rx))
            .await
            .expect("poller reported the change");
        assert_eq!(theme, Theme::Dark);

        drop(app);
        tokio::time::timeout(Duration::from_secs(30), poller)
            .await
            .expect("poller stops once the app is gone")
            .unwrap();
    }

    #[test]
    fn ephemeral_config_builds_without_touching_disk() {
        let mut config = ClientConfig::default();
        config.storage.ephemeral = true;
        assert!(App::from_config(&config).is_ok());
    }
}
