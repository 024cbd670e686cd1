//! User profile entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{JoinedEvent, Preferences};

/// Prefix of generated user IDs.
pub const GENERATED_USER_ID_PREFIX: &str = "usr-";

/// Generates a time-based fallback user ID.
///
/// Used only when neither the payload nor the caller's identity supplies one.
pub fn generate_user_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{GENERATED_USER_ID_PREFIX}{}-{}",
        Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}

/// The fields an update replaces.
///
/// Every field is written on every update; there is no partial patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// User preferences.
    pub preferences: Preferences,
    /// Profile picture URL.
    pub profile_picture_url: Option<String>,
    /// Short biography.
    pub bio: Option<String>,
    /// Free-text location.
    pub location: Option<String>,
    /// Personal website.
    pub website: Option<String>,
    /// Events the user joined, in join order.
    pub joined_events: Vec<JoinedEvent>,
}

/// A user profile record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Primary key; the identity subject when known.
    #[serde(rename = "userID")]
    pub user_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact address, also a secondary lookup key.
    #[serde(default)]
    pub email: String,
    /// User preferences.
    #[serde(default)]
    pub preferences: Preferences,
    /// Profile picture URL.
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    /// Short biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Free-text location.
    #[serde(default)]
    pub location: Option<String>,
    /// Personal website.
    #[serde(default)]
    pub website: Option<String>,
    /// Events the user joined, in join order.
    #[serde(default)]
    pub joined_events: Vec<JoinedEvent>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a profile with empty fields.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::from_fields(user_id, ProfileFields::default(), Utc::now())
    }

    /// Creates a profile from its replaceable fields.
    pub fn from_fields(
        user_id: impl Into<String>,
        fields: ProfileFields,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut profile = Self {
            user_id: user_id.into(),
            name: String::new(),
            email: String::new(),
            preferences: Preferences::default(),
            profile_picture_url: None,
            bio: None,
            location: None,
            website: None,
            joined_events: Vec::new(),
            created_at,
        };
        profile.replace_fields(fields);
        profile
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Returns a copy of the replaceable fields.
    pub fn fields(&self) -> ProfileFields {
        ProfileFields {
            name: self.name.clone(),
            email: self.email.clone(),
            preferences: self.preferences.clone(),
            profile_picture_url: self.profile_picture_url.clone(),
            bio: self.bio.clone(),
            location: self.location.clone(),
            website: self.website.clone(),
            joined_events: self.joined_events.clone(),
        }
    }

    /// Overwrites every replaceable field. `user_id` and `created_at` are kept.
    pub fn replace_fields(&mut self, fields: ProfileFields) {
        let ProfileFields {
            name,
            email,
            preferences,
            profile_picture_url,
            bio,
            location,
            website,
            joined_events,
        } = fields;

        self.name = name;
        self.email = email;
        self.preferences = preferences;
        self.profile_picture_url = profile_picture_url;
        self.bio = bio;
        self.location = location;
        self.website = website;
        self.joined_events = joined_events;
    }

    /// Returns true if the user has joined the event.
    pub fn has_joined(&self, event_id: &str) -> bool {
        self.joined_events.iter().any(|e| e.event_id == event_id)
    }
}
