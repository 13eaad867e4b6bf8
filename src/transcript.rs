//! In-memory conversation transcript.
//!
//! The transcript is the source of truth for what the chat pane shows.
//! Message turns and error bubbles (shown as assistant replies) count
//! toward the control-enablement thresholds. The reflection never counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Turns required before a reflection can be requested.
pub const REFLECTION_MIN_TURNS: usize = 4;

/// Turns required before the conversation can be cleared.
pub const CLEAR_MIN_TURNS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// One rendered item in the chat pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Message(Turn),
    /// Visible failure notice.
    Error { text: String },
    /// At most one exists at a time.
    Reflection { text: String },
}

impl Entry {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Message(turn) => &turn.text,
            Self::Error { text } | Self::Reflection { text } => text,
        }
    }
}

/// Ordered, append-only (until cleared) list of chat entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_turn(&mut self, role: Role, text: impl Into<String>) {
        self.entries.push(Entry::Message(Turn {
            role,
            text: text.into(),
            at: Utc::now(),
        }));
    }

    pub fn push_error(&mut self, text: impl Into<String>) {
        self.entries.push(Entry::Error { text: text.into() });
    }

    /// Remove any existing reflection and append `text` as the new one.
    /// Returns true if an older reflection was replaced.
    pub fn replace_reflection(&mut self, text: impl Into<String>) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !matches!(entry, Entry::Reflection { .. }));
        let replaced = self.entries.len() != before;
        self.entries.push(Entry::Reflection { text: text.into() });
        replaced
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Whether nothing at all is displayed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of user/assistant bubbles. An error bubble counts as an
    /// assistant turn.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Entry::Message(_) | Entry::Error { .. }))
            .count()
    }

    #[must_use]
    pub fn reflection(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Reflection { text } => Some(text.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn controls(&self) -> Controls {
        Controls::for_turns(self.turn_count())
    }
}

/// Enablement of the reflection and clear buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub reflection_enabled: bool,
    pub clear_enabled: bool,
}

impl Controls {
    #[must_use]
    pub fn for_turns(turns: usize) -> Self {
        Self {
            reflection_enabled: turns >= REFLECTION_MIN_TURNS,
            clear_enabled: turns >= CLEAR_MIN_TURNS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflection_threshold_is_four_turns() {
        for turns in 0..=3 {
            assert!(!Controls::for_turns(turns).reflection_enabled, "{turns}");
        }
        assert!(Controls::for_turns(4).reflection_enabled);
        assert!(Controls::for_turns(9).reflection_enabled);
    }

    #[test]
    fn clear_threshold_is_one_turn() {
        assert!(!Controls::for_turns(0).clear_enabled);
        assert!(Controls::for_turns(1).clear_enabled);
    }

    #[test]
    fn errors_count_as_turns_but_reflections_do_not() {
        let mut transcript = Transcript::new();
        transcript.push_turn(Role::User, "hello");
        transcript.push_error("boom");
        transcript.replace_reflection("you are doing well");
        assert_eq!(transcript.turn_count(), 2);
        assert_eq!(transcript.entries().len(), 3);
    }

    #[test]
    fn two_failed_sends_unlock_reflection() {
        let mut transcript = Transcript::new();
        for _ in 0..2 {
            transcript.push_turn(Role::User, "hello?");
            transcript.push_error("Network connection error.");
        }
        assert!(transcript.controls().reflection_enabled);
    }

    #[test]
    fn replace_reflection_keeps_at_most_one() {
        let mut transcript = Transcript::new();
        transcript.push_turn(Role::User, "a");
        assert!(!transcript.replace_reflection("first"));
        transcript.push_turn(Role::Assistant, "b");
        assert!(transcript.replace_reflection("second"));

        let reflections = transcript
            .entries()
            .iter()
            .filter(|e| matches!(e, Entry::Reflection { .. }))
            .count();
        assert_eq!(reflections, 1);
        assert_eq!(transcript.reflection(), Some("second"));
        assert!(matches!(
            transcript.entries().last(),
            Some(Entry::Reflection { .. })
        ));
    }

    #[test]
    fn clear_empties_everything() {
        let mut transcript = Transcript::new();
        transcript.push_turn(Role::User, "a");
        transcript.replace_reflection("r");
        transcript.clear();
        assert!(transcript.is_empty());
        assert_eq!(transcript.turn_count(), 0);
        assert!(transcript.reflection().is_none());
    }

    #[test]
    fn entry_serializes_with_kind_tag() {
        let mut transcript = Transcript::new();
        transcript.push_error("oops");
        let json = serde_json::to_value(&transcript.entries()[0]).unwrap_or_default();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["text"], "oops");
    }
}
