//! User types for authentication

use serde::{Deserialize, Serialize};

use crate::{AuthError, IdentityClaims};

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Identity subject
    pub id: String,

    /// Email address (if available)
    pub email: Option<String>,

    /// Display name (if available)
    pub name: Option<String>,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }

    /// Sets the email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the display name, falling back to the email local-part or ID
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.email.as_deref().map(email_local_part))
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }
}

impl TryFrom<IdentityClaims> for AuthenticatedUser {
    type Error = AuthError;

    fn try_from(claims: IdentityClaims) -> Result<Self, Self::Error> {
        let id = claims.subject()?.to_string();
        let name = claims.display_name().map(str::to_string);

        Ok(Self {
            id,
            email: claims.email.filter(|e| !e.is_empty()),
            name,
        })
    }
}

/// Returns the part of an email address before the `@`
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_user_display_name() {
        let user = AuthenticatedUser::new("user-123");
        assert_eq!(user.display_name(), "user-123");

        let user_with_email = AuthenticatedUser::new("user-123").with_email("test@example.com");
        assert_eq!(user_with_email.display_name(), "test");

        let user_with_name = AuthenticatedUser::new("user-123")
            .with_email("test@example.com")
            .with_name("Test User");
        assert_eq!(user_with_name.display_name(), "Test User");
    }

    #[test]
    fn test_user_from_claims() {
        let claims = IdentityClaims::new(
            "sub-1",
            Some("fan@gigs.io".to_string()),
            Some("Fan".to_string()),
            1,
        );

        let user = AuthenticatedUser::try_from(claims).unwrap();
        assert_eq!(user.id, "sub-1");
        assert_eq!(user.email.as_deref(), Some("fan@gigs.io"));
        assert_eq!(user.name.as_deref(), Some("Fan"));
    }

    #[test]
    fn test_user_from_claims_without_subject() {
        let claims = IdentityClaims::new("", None, None, 1);
        assert!(matches!(
            AuthenticatedUser::try_from(claims),
            Err(AuthError::MissingSubject)
        ));
    }

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part("alice@x.com"), "alice");
        assert_eq!(email_local_part("no-at-sign"), "no-at-sign");
    }
}
