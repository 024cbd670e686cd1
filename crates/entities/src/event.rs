//! Joined event entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A copy of an event's details taken when the user joined it.
///
/// Later edits to the event or its venue are not reflected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedEvent {
    /// Event identifier.
    #[serde(rename = "eventID")]
    pub event_id: String,
    /// Event name.
    #[serde(default)]
    pub name: String,
    /// Event date as shown on the event page.
    #[serde(default)]
    pub event_date: Option<String>,
    /// Event start time as shown on the event page.
    #[serde(default)]
    pub event_time: Option<String>,
    /// Venue identifier.
    #[serde(rename = "venueID", default)]
    pub venue_id: Option<String>,
    /// Event description.
    #[serde(default)]
    pub description: Option<String>,
    /// Event image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// When the user joined.
    pub joined_at: DateTime<Utc>,
}

impl JoinedEvent {
    /// Creates a joined event entry stamped with the current time.
    pub fn new(event_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            name: name.into(),
            event_date: None,
            event_time: None,
            venue_id: None,
            description: None,
            image_url: None,
            joined_at: Utc::now(),
        }
    }

    /// Sets the event date and time.
    pub fn with_schedule(mut self, date: impl Into<String>, time: impl Into<String>) -> Self {
        self.event_date = Some(date.into());
        self.event_time = Some(time.into());
        self
    }

    /// Sets the venue.
    pub fn with_venue(mut self, venue_id: impl Into<String>) -> Self {
        self.venue_id = Some(venue_id.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the image URL.
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Sets the join timestamp.
    pub fn with_joined_at(mut self, joined_at: DateTime<Utc>) -> Self {
        self.joined_at = joined_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_event_wire_names() {
        let event = JoinedEvent::new("e1", "Open Mic")
            .with_schedule("2026-11-02", "19:30")
            .with_venue("v9");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventID"], "e1");
        assert_eq!(json["venueID"], "v9");
        assert_eq!(json["eventDate"], "2026-11-02");
        assert_eq!(json["eventTime"], "19:30");
        assert!(json["imageUrl"].is_null());
        assert!(json.get("joinedAt").is_some());
    }

    #[test]
    fn test_joined_event_sparse_payload() {
        let event: JoinedEvent = serde_json::from_value(serde_json::json!({
            "eventID": "e2",
            "joinedAt": "2026-10-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(event.event_id, "e2");
        assert_eq!(event.name, "");
        assert!(event.venue_id.is_none());
    }
}
