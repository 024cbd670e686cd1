//! Route paths of the profile service.

/// Collection route: list, create and body-keyed update.
pub const USERS: &str = "/users";

/// Route pattern for a single record, as registered on the router.
pub const USER_BY_ID: &str = "/users/:id";

/// Route for the caller's own record.
pub const CURRENT_USER: &str = "/users/me";

/// Health check route.
pub const HEALTH: &str = "/health";

/// Builds the path of a single record, percent-encoding the identifier.
pub fn user(identifier: &str) -> String {
    format!("{USERS}/{}", urlencoding::encode(identifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_path_encodes_identifier() {
        assert_eq!(user("u1"), "/users/u1");
        assert_eq!(user("a b@c.com"), "/users/a%20b%40c.com");
    }
}
