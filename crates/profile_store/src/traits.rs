//! Profile store trait definitions.

use async_trait::async_trait;
use entities::{ProfileFields, UserProfile};

use crate::ProfileStoreResult;

/// Entity type reported in not found errors.
pub const USER_PROFILE_ENTITY: &str = "UserProfile";

/// Filter options for listing profiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileFilter {
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
}

impl ProfileFilter {
    /// Creates a filter that returns every profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the page offset.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Trait for profile storage operations.
///
/// The store is a key-value table: whole records are written and read by
/// `user_id`, and `email` is only reachable by scanning.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Writes a profile, overwriting any record with the same key.
    ///
    /// Returns true if an existing record was overwritten.
    async fn put_profile(&self, profile: UserProfile) -> ProfileStoreResult<bool>;

    /// Gets a profile by primary key.
    async fn get_profile(&self, user_id: &str) -> ProfileStoreResult<Option<UserProfile>>;

    /// Scans for the first profile with an exactly matching email.
    async fn find_profile_by_email(&self, email: &str)
        -> ProfileStoreResult<Option<UserProfile>>;

    /// Lists profiles ordered by `user_id`.
    async fn list_profiles(&self, filter: ProfileFilter) -> ProfileStoreResult<Vec<UserProfile>>;

    /// Replaces every field except `user_id` and `created_at`.
    ///
    /// Fails with `NotFound` if no record has this key.
    async fn replace_profile(&self, user_id: &str, fields: ProfileFields)
        -> ProfileStoreResult<()>;

    /// Deletes a profile. Deleting a missing key succeeds.
    async fn delete_profile(&self, user_id: &str) -> ProfileStoreResult<()>;

    /// Looks up a profile by primary key, then by email.
    ///
    /// Callers sometimes only know the email address, so a primary key miss
    /// falls back to the email scan.
    async fn resolve_profile(&self, identifier: &str) -> ProfileStoreResult<Option<UserProfile>> {
        if identifier.is_empty() {
            return Ok(None);
        }

        if let Some(profile) = self.get_profile(identifier).await? {
            return Ok(Some(profile));
        }

        tracing::debug!(identifier = %identifier, "Primary key miss, scanning by email");
        self.find_profile_by_email(identifier).await
    }
}

/// Applies a filter to an already ordered result set.
pub(crate) fn paginate(profiles: Vec<UserProfile>, filter: ProfileFilter) -> Vec<UserProfile> {
    let offset = filter.offset.unwrap_or(0) as usize;
    let limit = filter.limit.map_or(usize::MAX, |l| l as usize);

    profiles.into_iter().skip(offset).take(limit).collect()
}
