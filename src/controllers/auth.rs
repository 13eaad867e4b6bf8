//! Session state: login, signup, logout and the header projection.

use crate::api::ApiClient;
use crate::controllers::preferences::PreferencesController;
use crate::error::ClientError;
use crate::events::{EventBus, UiEvent};
use crate::storage::{KeyValueStore, keys, remove_or_warn, store_bool_or_warn, store_or_warn};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Whether a user is signed in, and who.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionFlag {
    pub is_logged_in: bool,
    pub username: Option<String>,
}

/// Header area: auth buttons when logged out, profile badge when logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    pub show_auth_buttons: bool,
    pub login_label: &'static str,
    pub signup_label: &'static str,
    pub logout_label: &'static str,
    /// `Some` only while logged in.
    pub profile: Option<ProfileBadge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileBadge {
    pub username: String,
    pub greeting: String,
}

pub struct AuthController {
    api: Arc<dyn ApiClient>,
    store: Arc<dyn KeyValueStore>,
    prefs: Arc<PreferencesController>,
    events: EventBus,
    session: Mutex<SessionFlag>,
}

impl AuthController {
    pub fn new(
        api: Arc<dyn ApiClient>,
        store: Arc<dyn KeyValueStore>,
        prefs: Arc<PreferencesController>,
        events: EventBus,
    ) -> Self {
        Self {
            api,
            store,
            prefs,
            events,
            session: Mutex::new(SessionFlag::default()),
        }
    }

    #[must_use]
    pub fn session(&self) -> SessionFlag {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session().is_logged_in
    }

    /// Re-apply a session persisted by an earlier run. Returns whether one
    /// was found.
    pub fn restore(&self) -> bool {
        let logged_in = self.store.get_bool(keys::IS_LOGGED_IN).unwrap_or(false);
        let username = self.store.get(keys::CURRENT_USER);
        match (logged_in, username) {
            (true, Some(username)) if !username.is_empty() => {
                tracing::debug!(%username, "restored stored session");
                self.enter(username);
                true
            }
            _ => false,
        }
    }

    /// Ask the server whether the cookie session is still valid.
    ///
    /// An authenticated answer applies the login transition. An
    /// unauthenticated answer clears a stale stored session. Transport
    /// errors leave local state alone.
    pub async fn check_status(&self) -> bool {
        match self.api.auth_status().await {
            Ok(status) => match status.username() {
                Some(username) if status.is_authenticated => {
                    self.enter(username.to_owned());
                    true
                }
                _ => {
                    if self.is_logged_in() {
                        tracing::info!("server reports no session, clearing stored login");
                        self.leave();
                    }
                    false
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "auth status check failed");
                self.is_logged_in()
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> bool {
        match self.api.login(email, password).await {
            Ok(reply) => {
                tracing::info!(username = %reply.username, "login succeeded");
                self.enter(reply.username);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "login failed");
                self.alert(&e, self.prefs.language().text().login_error);
                false
            }
        }
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> bool {
        match self.api.signup(name, email, password).await {
            Ok(reply) => {
                tracing::info!(username = %reply.username, "signup succeeded");
                self.enter(reply.username);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "signup failed");
                self.alert(&e, self.prefs.language().text().signup_error);
                false
            }
        }
    }

    /// End the session. A failed request keeps the session and raises an
    /// alert instead.
    pub async fn logout(&self) -> bool {
        match self.api.logout().await {
            Ok(()) => {
                tracing::info!("logout succeeded");
                self.leave();
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "logout request failed");
                self.alert(&e, self.prefs.language().text().logout_error);
                false
            }
        }
    }

    #[must_use]
    pub fn header(&self) -> HeaderView {
        let text = self.prefs.language().text();
        let session = self.session();
        let profile = match (session.is_logged_in, session.username) {
            (true, Some(username)) => Some(ProfileBadge {
                greeting: format!("{}{username}", text.welcome_back),
                username,
            }),
            _ => None,
        };
        HeaderView {
            show_auth_buttons: profile.is_none(),
            login_label: text.login,
            signup_label: text.signup,
            logout_label: text.logout,
            profile,
        }
    }

    fn enter(&self, username: String) {
        {
            let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
            session.is_logged_in = true;
            session.username = Some(username.clone());
        }
        store_bool_or_warn(self.store.as_ref(), keys::IS_LOGGED_IN, true);
        store_or_warn(self.store.as_ref(), keys::CURRENT_USER, &username);
        self.events.publish(UiEvent::AuthLogin { username });
    }

    fn leave(&self) {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = SessionFlag::default();
        remove_or_warn(self.store.as_ref(), keys::IS_LOGGED_IN);
        remove_or_warn(self.store.as_ref(), keys::CURRENT_USER);
        self.events.publish(UiEvent::AuthLogout);
    }

    fn alert(&self, error: &ClientError, fallback: &str) {
        let message = error.server_message().unwrap_or(fallback).to_owned();
        self.events.publish(UiEvent::Alert { message });
    }
}
