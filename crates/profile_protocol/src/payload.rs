//! Profile payload accepted by create and update.

use chrono::{DateTime, Utc};
use entities::{JoinedEvent, Preferences, ProfileFields, UserProfile};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A full or partial profile as sent by clients.
///
/// Every field is optional on the wire. `to_fields` turns it into the
/// complete set of replaceable fields, filling whatever is missing with empty
/// values, so an update never leaves a field from the previous record behind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    /// Record key. Required by the body-keyed update.
    #[serde(rename = "userID", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Display name; any JSON value is coerced to a string.
    #[serde(default)]
    pub name: Option<Value>,
    /// Contact address; any JSON value is coerced to a string.
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub joined_events: Option<Vec<JoinedEvent>>,
    /// Only honoured on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Coerces a loosely typed JSON value to a string.
///
/// Null and absent values become the empty string, strings are kept, anything
/// else is written as its JSON text.
pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl ProfilePayload {
    /// Builds a payload carrying every field of a profile.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            user_id: Some(profile.user_id.clone()),
            name: Some(Value::String(profile.name.clone())),
            email: Some(Value::String(profile.email.clone())),
            preferences: Some(profile.preferences.clone()),
            profile_picture_url: profile.profile_picture_url.clone(),
            bio: profile.bio.clone(),
            location: profile.location.clone(),
            website: profile.website.clone(),
            joined_events: Some(profile.joined_events.clone()),
            created_at: Some(profile.created_at),
        }
    }

    /// Returns the record key if present and non-empty.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Normalizes the payload into the complete set of replaceable fields.
    pub fn to_fields(&self) -> ProfileFields {
        ProfileFields {
            name: coerce_string(self.name.as_ref()),
            email: coerce_string(self.email.as_ref()),
            preferences: self.preferences.clone().unwrap_or_default(),
            profile_picture_url: self.profile_picture_url.clone(),
            bio: self.bio.clone(),
            location: self.location.clone(),
            website: self.website.clone(),
            joined_events: self.joined_events.clone().unwrap_or_default(),
        }
    }

    /// Builds a new record from this payload.
    ///
    /// `createdAt` defaults to now.
    pub fn into_profile(self, user_id: impl Into<String>) -> UserProfile {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        UserProfile::from_fields(user_id, self.to_fields(), created_at)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_coerce_string() {
        assert_eq!(coerce_string(None), "");
        assert_eq!(coerce_string(Some(&Value::Null)), "");
        assert_eq!(coerce_string(Some(&json!(""))), "");
        assert_eq!(coerce_string(Some(&json!("Bob"))), "Bob");
        assert_eq!(coerce_string(Some(&json!(42))), "42");
        assert_eq!(coerce_string(Some(&json!(true))), "true");
    }

    #[test]
    fn test_partial_payload_fills_defaults() {
        let payload: ProfilePayload =
            serde_json::from_value(json!({ "name": "Alice", "email": "alice@x.com" })).unwrap();

        assert!(payload.user_id().is_none());

        let profile = payload.into_profile("u1");
        assert_eq!(profile.name, "Alice");
        assert!(profile.preferences.is_empty());
        assert!(profile.joined_events.is_empty());
        assert!(profile.website.is_none());
    }

    #[test]
    fn test_null_collections_become_empty() {
        let payload: ProfilePayload = serde_json::from_value(json!({
            "userID": "u1",
            "name": null,
            "preferences": null,
            "joinedEvents": null
        }))
        .unwrap();

        let fields = payload.to_fields();
        assert_eq!(fields.name, "");
        assert!(fields.preferences.is_empty());
        assert!(fields.joined_events.is_empty());
    }

    #[test]
    fn test_empty_user_id_is_absent() {
        let payload = ProfilePayload {
            user_id: Some(String::new()),
            ..ProfilePayload::default()
        };
        assert!(payload.user_id().is_none());
    }

    #[test]
    fn test_from_profile_carries_every_field() {
        let mut profile = UserProfile::new("u1").with_name("Alice").with_email("a@b.com");
        profile.bio = Some("bio".to_string());
        profile.joined_events.push(JoinedEvent::new("e1", "Gig"));

        let payload = ProfilePayload::from_profile(&profile);
        assert_eq!(payload.user_id(), Some("u1"));
        assert_eq!(payload.to_fields(), profile.fields());
        assert_eq!(payload.clone().into_profile("u1"), profile);
    }

    #[test]
    fn test_payload_rejects_wrong_shapes() {
        let result: Result<ProfilePayload, _> =
            serde_json::from_value(json!({ "joinedEvents": "not-a-list" }));
        assert!(result.is_err());
    }
}
