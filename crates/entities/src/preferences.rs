//! User preference definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maximum number of genres a user can select.
pub const MAX_GENRES: usize = 3;

/// Genres a user can pick from.
pub const GENRES: &[&str] = &[
    "rock",
    "pop",
    "jazz",
    "blues",
    "hip-hop",
    "electronic",
    "classical",
    "country",
    "folk",
    "metal",
    "indie",
    "punk",
    "r&b",
    "reggae",
    "latin",
];

/// Returns true if the genre is one users can select.
pub fn is_known_genre(genre: &str) -> bool {
    GENRES.contains(&genre)
}

/// User preferences.
///
/// Stored as an open mapping: the recognized keys have typed fields, anything
/// else a client sends is kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Selected genres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    /// Whether to send email notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    /// Whether to send reminders for joined events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_reminders: Option<bool>,
    /// Whether to suggest events near the user's location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_suggestions: Option<bool>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Preferences {
    /// Creates an empty preference mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preferences given to a profile created from identity claims.
    pub fn with_default_notifications() -> Self {
        Self {
            email_notifications: Some(true),
            event_reminders: Some(true),
            ..Self::default()
        }
    }

    /// Sets the selected genres.
    pub fn with_genres<I, G>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        self.genres = Some(genres.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if no key is set.
    pub fn is_empty(&self) -> bool {
        self.genres.is_none()
            && self.email_notifications.is_none()
            && self.event_reminders.is_none()
            && self.location_suggestions.is_none()
            && self.extra.is_empty()
    }

    /// Returns the selected genres, or an empty slice.
    pub fn genres(&self) -> &[String] {
        self.genres.as_deref().unwrap_or_default()
    }
}
