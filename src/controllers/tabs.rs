//! Tabbed navigation between the chat, insights and resources panes.

use crate::controllers::preferences::PreferencesController;
use crate::events::{EventBus, UiEvent};
use crate::i18n::UiText;
use crate::storage::{KeyValueStore, keys, store_or_warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Chat,
    Insights,
    Resources,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Chat, Tab::Insights, Tab::Resources];

    /// Button id, as stored under `activeTab`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Chat => "chat",
            Tab::Insights => "insights",
            Tab::Resources => "resources",
        }
    }

    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.as_str() == id)
    }

    /// Id of the pane this tab reveals.
    #[must_use]
    pub fn pane_id(self) -> String {
        format!("{}-tab", self.as_str())
    }

    #[must_use]
    pub fn label(self, text: &UiText) -> &'static str {
        match self {
            Tab::Chat => text.chat_tab,
            Tab::Insights => text.insights_tab,
            Tab::Resources => text.resources_tab,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabButton {
    pub id: &'static str,
    pub pane_id: String,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabsView {
    pub active: Tab,
    pub buttons: Vec<TabButton>,
}

pub struct TabController {
    store: Arc<dyn KeyValueStore>,
    prefs: Arc<PreferencesController>,
    events: EventBus,
    active: Mutex<Tab>,
}

impl TabController {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        prefs: Arc<PreferencesController>,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            prefs,
            events,
            active: Mutex::new(Tab::default()),
        }
    }

    #[must_use]
    pub fn active(&self) -> Tab {
        *self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Show the pane for `id`. Unknown ids change nothing.
    pub fn switch_tab(&self, id: &str) -> Option<Tab> {
        let Some(tab) = Tab::parse(id) else {
            tracing::debug!(id, "ignoring switch to unknown tab");
            return None;
        };
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = tab;
        store_or_warn(self.store.as_ref(), keys::ACTIVE_TAB, tab.as_str());
        self.events.publish(UiEvent::TabChanged { tab });
        Some(tab)
    }

    /// Re-open the tab stored by an earlier run, if any.
    pub fn restore(&self) -> Option<Tab> {
        let stored = self.store.get(keys::ACTIVE_TAB)?;
        self.switch_tab(&stored)
    }

    #[must_use]
    pub fn view(&self) -> TabsView {
        let text = self.prefs.language().text();
        let active = self.active();
        TabsView {
            active,
            buttons: Tab::ALL
                .into_iter()
                .map(|tab| TabButton {
                    id: tab.as_str(),
                    pane_id: tab.pane_id(),
                    label: tab.label(text),
                    active: tab == active,
                })
                .collect(),
        }
    }
}
