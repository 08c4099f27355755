use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-space notification switches.
///
/// Keys are either a toggle group (`"proposals"`) or a group and type
/// joined by a double underscore (`"proposals__start_discussion"`). A
/// missing key means the notification is wanted; only an explicit
/// `false` suppresses anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct NotificationToggles(BTreeMap<String, bool>);

impl NotificationToggles {
    /// Toggles with nothing switched off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one switch, consuming and returning the toggles.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, enabled: bool) -> Self {
        self.0.insert(key.into(), enabled);
        self
    }

    /// Whether a notification of the given group and type is wanted.
    ///
    /// A group switched off suppresses every type in it, regardless of
    /// any per-type value.
    pub fn is_enabled(&self, group: &str, notification_type: Option<&str>) -> bool {
        if self.0.get(group) == Some(&false) {
            return false;
        }
        if let Some(kind) = notification_type {
            if self.0.get(&format!("{group}__{kind}")) == Some(&false) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_allow_everything() {
        let toggles = NotificationToggles::new();
        assert!(toggles.is_enabled("proposals", None));
        assert!(toggles.is_enabled("proposals", Some("start_discussion")));
    }

    #[test]
    fn group_off_beats_type_on() {
        let toggles = NotificationToggles::new()
            .with("proposals", false)
            .with("proposals__start_discussion", true);

        assert!(!toggles.is_enabled("proposals", Some("start_discussion")));
        assert!(!toggles.is_enabled("proposals", Some("vote")));
    }

    #[test]
    fn type_off_only_suppresses_that_type() {
        let toggles = NotificationToggles::new().with("forum__comment.created", false);

        assert!(!toggles.is_enabled("forum", Some("comment.created")));
        assert!(toggles.is_enabled("forum", Some("comment.replied")));
        assert!(toggles.is_enabled("forum", None));
        assert!(toggles.is_enabled("pages", Some("comment.created")));
    }

    #[test]
    fn map_form_round_trips_through_json() {
        let toggles = NotificationToggles::new().with("polls", false);

        let json = serde_json::to_value(&toggles).unwrap();
        assert_eq!(json, serde_json::json!({ "polls": false }));

        let back: NotificationToggles = serde_json::from_value(json).unwrap();
        assert_eq!(back, toggles);
    }
}
