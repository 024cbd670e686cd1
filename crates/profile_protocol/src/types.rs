//! Request and response bodies.

use serde::{Deserialize, Serialize};

/// Query parameters accepted by the list route.
///
/// Both are optional; without them the whole table is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListProfilesQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Response to a create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProfileResponse {
    #[serde(rename = "userID")]
    pub user_id: String,
}

/// Response to a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProfileResponse {
    pub message: String,
}

impl DeleteProfileResponse {
    /// Confirmation for a deleted key.
    pub fn deleted(user_id: &str) -> Self {
        Self {
            message: format!("User {user_id} deleted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_response_wire_name() {
        let json = serde_json::to_value(CreateProfileResponse {
            user_id: "usr-1".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "userID": "usr-1" }));
    }
}
