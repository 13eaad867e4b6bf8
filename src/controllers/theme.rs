//! Light/dark theme selection.
//!
//! Until the user picks a theme explicitly, the controller follows the OS
//! appearance. An explicit choice is persisted (both as `theme` and as the
//! legacy `darkMode` boolean) and wins over later OS changes.

use crate::api::ApiClient;
use crate::events::{EventBus, UiEvent};
use crate::storage::{KeyValueStore, keys, store_bool_or_warn, store_or_warn};
use crate::theme::Theme;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Root element attribute that carries the theme name.
pub const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Debug, Clone, Copy)]
struct ThemeState {
    theme: Theme,
    explicit: bool,
}

pub struct ThemeController {
    api: Arc<dyn ApiClient>,
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    state: Mutex<ThemeState>,
}

impl ThemeController {
    /// Load the stored theme, or start from `system_theme` when the user
    /// never chose one.
    pub fn new(
        api: Arc<dyn ApiClient>,
        store: Arc<dyn KeyValueStore>,
        events: EventBus,
        system_theme: Theme,
    ) -> Self {
        let stored = store
            .get(keys::THEME)
            .and_then(|raw| Theme::parse(&raw))
            .or_else(|| store.get_bool(keys::DARK_MODE).map(Theme::from_dark));
        let state = match stored {
            Some(theme) => ThemeState {
                theme,
                explicit: true,
            },
            None => ThemeState {
                theme: system_theme,
                explicit: false,
            },
        };
        tracing::debug!(theme = %state.theme, explicit = state.explicit, "theme loaded");

        Self {
            api,
            store,
            events,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> ThemeState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.state().theme
    }

    /// Whether the current theme came from the user rather than the OS.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.state().explicit
    }

    /// `(attribute, value)` for the document root.
    #[must_use]
    pub fn root_attribute(&self) -> (&'static str, &'static str) {
        (THEME_ATTRIBUTE, self.theme().as_str())
    }

    /// Apply the user's explicit choice. Server sync failures are logged
    /// only.
    pub async fn set_theme(&self, dark: bool) {
        let theme = Theme::from_dark(dark);
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = ThemeState {
            theme,
            explicit: true,
        };
        store_or_warn(self.store.as_ref(), keys::THEME, theme.as_str());
        store_bool_or_warn(self.store.as_ref(), keys::DARK_MODE, dark);
        self.events.publish(UiEvent::ThemeChanged { theme });

        if let Err(e) = self.api.set_theme(theme).await {
            tracing::warn!(error = %e, %theme, "failed to sync theme to server");
        }
    }

    /// React to an OS appearance change. Returns whether it was applied.
    pub fn on_system_theme(&self, theme: Theme) -> bool {
        let changed = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.explicit || state.theme == theme {
                false
            } else {
                state.theme = theme;
                true
            }
        };
        if changed {
            tracing::debug!(%theme, "following system theme");
            self.events.publish(UiEvent::ThemeChanged { theme });
        }
        changed
    }

    /// Follow OS appearance updates until the sender is dropped.
    pub fn follow_system(self: &Arc<Self>, mut updates: watch::Receiver<Theme>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let theme = *updates.borrow_and_update();
                controller.on_system_theme(theme);
            }
        })
    }
}
