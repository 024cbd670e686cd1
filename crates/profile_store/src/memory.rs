//! In-memory profile store implementation.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use entities::{ProfileFields, UserProfile};
use tokio::sync::RwLock;

use crate::{
    traits::paginate, ProfileFilter, ProfileStore, ProfileStoreError, ProfileStoreResult,
    USER_PROFILE_ENTITY,
};

/// In-memory profile store for tests and single-process runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryProfileStore {
    profiles: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl MemoryProfileStore {
    /// Creates a new in-memory profile store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored profiles.
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    /// Returns true if no profile is stored.
    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn put_profile(&self, profile: UserProfile) -> ProfileStoreResult<bool> {
        let mut profiles = self.profiles.write().await;
        Ok(profiles.insert(profile.user_id.clone(), profile).is_some())
    }

    async fn get_profile(&self, user_id: &str) -> ProfileStoreResult<Option<UserProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(user_id).cloned())
    }

    async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> ProfileStoreResult<Option<UserProfile>> {
        let profiles = self.profiles.read().await;
        let mut matches: Vec<&UserProfile> =
            profiles.values().filter(|p| p.email == email).collect();
        matches.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(matches.first().map(|p| (*p).clone()))
    }

    async fn list_profiles(&self, filter: ProfileFilter) -> ProfileStoreResult<Vec<UserProfile>> {
        let profiles = self.profiles.read().await;
        let mut result: Vec<UserProfile> = profiles.values().cloned().collect();
        result.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(paginate(result, filter))
    }

    async fn replace_profile(
        &self,
        user_id: &str,
        fields: ProfileFields,
    ) -> ProfileStoreResult<()> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| ProfileStoreError::not_found(USER_PROFILE_ENTITY, user_id))?;
        profile.replace_fields(fields);
        Ok(())
    }

    async fn delete_profile(&self, user_id: &str) -> ProfileStoreResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles.remove(user_id);
        Ok(())
    }
}
