//! Reconciliation of partial profile edits.
//!
//! Update replaces every field of a record, so each edit a page makes is
//! applied to a complete local copy of the profile and the whole copy is sent.
//! There is no concurrency token: two pages editing the same profile at once
//! may overwrite each other, and the last successful write wins.

use std::future::Future;
use std::time::Duration;

use auth::{decode_unverified, email_local_part, AuthenticatedUser};
use entities::{is_known_genre, JoinedEvent, Preferences, UserProfile, MAX_GENRES};
use profile_protocol::ProfilePayload;
use tracing::{debug, info, warn};

use crate::{
    ClientConfig, ClientError, ClientResult, FileProfileCache, ProfileApi, ProfileCache,
    ProfileClient, SyncError, SyncResult,
};

/// Default timeout for each round-trip, matching [`ClientConfig`]'s default.
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(10);

/// Fields changed by the edit-details form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDetails {
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

/// Keeps one caller's profile in step with the server.
pub struct ProfileSync<A, C> {
    api: A,
    cache: C,
    caller: AuthenticatedUser,
    timeout: Duration,
    /// Last copy confirmed by the server (or the defaults before any exists).
    snapshot: Option<UserProfile>,
    /// Last edit that failed to save.
    pending: Option<UserProfile>,
}

impl ProfileSync<ProfileClient, FileProfileCache> {
    /// Creates a helper wired from configuration: HTTP client, file cache and
    /// the configured round-trip timeout.
    pub fn from_config(config: &ClientConfig, caller: AuthenticatedUser) -> SyncResult<Self> {
        let api = ProfileClient::from_config(config)?;
        let cache = FileProfileCache::new(config.cache_dir());

        Ok(Self::new(api, cache, caller).with_timeout(config.request_timeout()))
    }
}

impl<A: ProfileApi, C: ProfileCache> ProfileSync<A, C> {
    /// Creates a helper for a known caller.
    pub fn new(api: A, cache: C, caller: AuthenticatedUser) -> Self {
        Self {
            api,
            cache,
            caller,
            timeout: DEFAULT_SYNC_TIMEOUT,
            snapshot: None,
            pending: None,
        }
    }

    /// Creates a helper for the subject of an identity token.
    ///
    /// The token is only read, not verified; the server does that.
    pub fn from_token(api: A, cache: C, token: &str) -> SyncResult<Self> {
        let claims = decode_unverified(token)?;
        let caller = AuthenticatedUser::try_from(claims)?;
        Ok(Self::new(api, cache, caller))
    }

    /// Sets the timeout applied to each round-trip.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Timeout applied to each round-trip.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn caller(&self) -> &AuthenticatedUser {
        &self.caller
    }

    /// Returns the current snapshot without loading.
    pub fn snapshot(&self) -> Option<&UserProfile> {
        self.snapshot.as_ref()
    }

    /// Returns the edit that last failed to save.
    pub fn pending(&self) -> Option<&UserProfile> {
        self.pending.as_ref()
    }

    /// Drops the failed edit and returns it.
    pub fn discard_pending(&mut self) -> Option<UserProfile> {
        self.pending.take()
    }

    async fn timed<T>(&self, request: impl Future<Output = ClientResult<T>>) -> ClientResult<T> {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| ClientError::Timeout(format!("no response within {:?}", self.timeout)))?
    }

    /// Returns the caller's profile: snapshot, then cache, then server.
    pub async fn profile(&mut self) -> SyncResult<UserProfile> {
        if let Some(profile) = &self.snapshot {
            return Ok(profile.clone());
        }

        if let Some(profile) = self.cache.get(&self.caller.id).await {
            debug!(user_id = %self.caller.id, "Profile loaded from cache");
            self.snapshot = Some(profile.clone());
            return Ok(profile);
        }

        self.refresh().await
    }

    /// Fetches the caller's profile from the server.
    ///
    /// A missing record is not an error: the snapshot becomes a default profile
    /// built from the caller's claims, and nothing is written until the first
    /// edit.
    pub async fn refresh(&mut self) -> SyncResult<UserProfile> {
        let fetched = self.timed(self.api.get_profile(&self.caller.id)).await;

        let profile = match fetched {
            Ok(profile) => {
                self.cache.put(&self.caller.id, &profile).await;
                profile
            }
            Err(e) if e.is_not_found() => {
                debug!(user_id = %self.caller.id, "No profile stored yet, using defaults");
                default_profile(&self.caller)
            }
            Err(e) => return Err(e.into()),
        };

        self.snapshot = Some(profile.clone());
        Ok(profile)
    }

    /// Replaces the name, bio, location and website.
    pub async fn update_details(&mut self, details: ProfileDetails) -> SyncResult<UserProfile> {
        let mut profile = self.profile().await?;

        profile.name = details.name;
        profile.bio = details.bio;
        profile.location = details.location;
        profile.website = details.website;

        self.save(profile).await
    }

    /// Replaces the preferences.
    pub async fn update_preferences(&mut self, preferences: Preferences) -> SyncResult<UserProfile> {
        validate_preferences(&preferences)?;

        let mut profile = self.profile().await?;
        profile.preferences = preferences;

        self.save(profile).await
    }

    /// Sets the profile picture to an already uploaded image.
    pub async fn set_profile_picture(&mut self, url: impl Into<String>) -> SyncResult<UserProfile> {
        let mut profile = self.profile().await?;
        profile.profile_picture_url = Some(url.into());

        self.save(profile).await
    }

    /// Adds an event to the joined list. Joining twice changes nothing.
    pub async fn join_event(&mut self, event: JoinedEvent) -> SyncResult<UserProfile> {
        let mut profile = self.profile().await?;

        if profile.has_joined(&event.event_id) {
            debug!(event_id = %event.event_id, "Event already joined");
            return Ok(profile);
        }

        profile.joined_events.push(event);
        self.save(profile).await
    }

    /// Removes an event from the joined list. Leaving an event that was never
    /// joined changes nothing.
    pub async fn leave_event(&mut self, event_id: &str) -> SyncResult<UserProfile> {
        let mut profile = self.profile().await?;

        if !profile.has_joined(event_id) {
            debug!(event_id = %event_id, "Event not joined");
            return Ok(profile);
        }

        profile.joined_events.retain(|event| event.event_id != event_id);
        self.save(profile).await
    }

    /// Saves the failed edit again.
    pub async fn retry_pending(&mut self) -> SyncResult<UserProfile> {
        let profile = self.pending.take().ok_or(SyncError::NothingPending)?;
        self.save(profile).await
    }

    /// Deletes the caller's profile and forgets every local copy.
    pub async fn delete_account(&mut self) -> SyncResult<String> {
        let user_id = self
            .snapshot
            .as_ref()
            .map_or_else(|| self.caller.id.clone(), |p| p.user_id.clone());

        let message = self.timed(self.api.delete_profile(&user_id)).await?;

        self.cache.remove(&self.caller.id).await;
        self.snapshot = None;
        self.pending = None;

        info!(user_id = %user_id, "Account deleted");
        Ok(message)
    }

    /// Writes a complete profile. On failure the snapshot is left alone and
    /// the profile is kept as the pending edit.
    async fn save(&mut self, profile: UserProfile) -> SyncResult<UserProfile> {
        match self.write(&profile).await {
            Ok(saved) => {
                self.cache.put(&self.caller.id, &saved).await;
                self.snapshot = Some(saved.clone());
                self.pending = None;

                info!(user_id = %saved.user_id, "Profile saved");
                Ok(saved)
            }
            Err(source) => {
                warn!(user_id = %profile.user_id, error = %source, "Profile save failed");
                self.pending = Some(profile.clone());

                Err(SyncError::SaveFailed {
                    source,
                    pending: Box::new(profile),
                })
            }
        }
    }

    /// Update, then a single Create when the server has no record yet.
    async fn write(&self, profile: &UserProfile) -> ClientResult<UserProfile> {
        let payload = ProfilePayload::from_profile(profile);

        match self.timed(self.api.update_profile(&profile.user_id, &payload)).await {
            Ok(saved) => Ok(saved),
            Err(e) if e.is_not_found() => {
                debug!(user_id = %profile.user_id, "No stored profile, creating it");

                let user_id = self.timed(self.api.create_profile(&payload)).await?;
                let mut created = profile.clone();
                created.user_id = user_id;
                Ok(created)
            }
            Err(e) => Err(e),
        }
    }
}

/// Builds the profile shown before anything is stored for the caller.
pub fn default_profile(caller: &AuthenticatedUser) -> UserProfile {
    let name = caller
        .name
        .clone()
        .or_else(|| caller.email.as_deref().map(|e| email_local_part(e).to_string()))
        .unwrap_or_default();

    let mut profile = UserProfile::new(caller.id.as_str())
        .with_name(name)
        .with_email(caller.email.clone().unwrap_or_default());
    profile.preferences = Preferences::with_default_notifications();
    profile
}

/// Checks the genre selection rules.
pub fn validate_preferences(preferences: &Preferences) -> SyncResult<()> {
    let genres = preferences.genres();

    if genres.len() > MAX_GENRES {
        return Err(SyncError::InvalidPreferences(format!(
            "at most {MAX_GENRES} genres can be selected, got {}",
            genres.len()
        )));
    }

    if let Some(unknown) = genres.iter().find(|genre| !is_known_genre(genre)) {
        return Err(SyncError::InvalidPreferences(format!(
            "unknown genre: {unknown}"
        )));
    }

    Ok(())
}
