//! User profile API endpoints.

use std::sync::Arc;

use auth::AuthenticatedUser;
use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use entities::{UserProfile, generate_user_id};
use profile_protocol::{
    CreateProfileResponse, DeleteProfileResponse, ListProfilesQuery, ProfilePayload,
};
use profile_store::{ProfileFilter, ProfileStore, USER_PROFILE_ENTITY};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Lists profiles, optionally paginated.
pub async fn list_profiles<S: ProfileStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ListProfilesQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<UserProfile>>> {
    let Query(query) = query?;
    let filter = ProfileFilter {
        limit: query.limit,
        offset: query.offset,
    };

    let profiles = state.store.list_profiles(filter).await?;

    Ok(Json(profiles))
}

/// Creates a profile.
///
/// The key is taken from the payload, then from the verified caller, and only
/// generated when neither has one. An existing record with the same key is
/// overwritten.
pub async fn create_profile<S: ProfileStore>(
    State(state): State<Arc<AppState<S>>>,
    caller: Option<Extension<AuthenticatedUser>>,
    payload: Result<Json<ProfilePayload>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<CreateProfileResponse>)> {
    let Json(payload) = payload?;

    let user_id = match (payload.user_id(), caller) {
        (Some(id), _) => id.to_string(),
        (None, Some(Extension(caller))) => caller.id,
        (None, None) => generate_user_id(),
    };

    let profile = payload.into_profile(user_id.clone());
    let overwritten = state.store.put_profile(profile).await?;

    if overwritten {
        tracing::warn!(user_id = %user_id, "Create overwrote an existing profile");
    } else {
        tracing::info!(user_id = %user_id, "Profile created");
    }

    Ok((StatusCode::CREATED, Json(CreateProfileResponse { user_id })))
}

/// Gets a profile by user ID or email.
pub async fn get_profile<S: ProfileStore>(
    State(state): State<Arc<AppState<S>>>,
    identifier: Result<Path<String>, PathRejection>,
) -> ServerResult<Json<UserProfile>> {
    let Path(identifier) = identifier?;
    let profile = state
        .store
        .resolve_profile(&identifier)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("{USER_PROFILE_ENTITY} not found: {identifier}")))?;

    Ok(Json(profile))
}

/// Gets the verified caller's profile.
pub async fn get_current_profile<S: ProfileStore>(
    State(state): State<Arc<AppState<S>>>,
    caller: Option<Extension<AuthenticatedUser>>,
) -> ServerResult<Json<UserProfile>> {
    let Extension(caller) = caller.ok_or(ServerError::AuthenticationRequired)?;

    let mut profile = state.store.resolve_profile(&caller.id).await?;
    if profile.is_none() {
        if let Some(email) = &caller.email {
            profile = state.store.resolve_profile(email).await?;
        }
    }

    profile
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("{USER_PROFILE_ENTITY} not found: {}", caller.id)))
}

/// Replaces a profile keyed by the request path.
pub async fn replace_profile_by_path<S: ProfileStore>(
    State(state): State<Arc<AppState<S>>>,
    user_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<ProfilePayload>, JsonRejection>,
) -> ServerResult<Json<UserProfile>> {
    let Path(user_id) = user_id?;
    let Json(payload) = payload?;

    if let Some(body_id) = payload.user_id() {
        if body_id != user_id {
            tracing::debug!(user_id = %user_id, body_id = %body_id, "Ignoring userID in body");
        }
    }

    replace_profile(&state, &user_id, &payload).await.map(Json)
}

/// Replaces a profile keyed by the `userID` in the request body.
pub async fn replace_profile_by_body<S: ProfileStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ProfilePayload>, JsonRejection>,
) -> ServerResult<Json<UserProfile>> {
    let Json(payload) = payload?;

    let user_id = payload
        .user_id()
        .ok_or_else(|| ServerError::MalformedRequest("userID is required".to_string()))?
        .to_string();

    replace_profile(&state, &user_id, &payload).await.map(Json)
}

/// Overwrites every replaceable field, then returns the record as stored.
async fn replace_profile<S: ProfileStore>(
    state: &AppState<S>,
    user_id: &str,
    payload: &ProfilePayload,
) -> ServerResult<UserProfile> {
    state
        .store
        .replace_profile(user_id, payload.to_fields())
        .await?;

    tracing::info!(user_id = %user_id, "Profile replaced");

    state
        .store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("{USER_PROFILE_ENTITY} not found: {user_id}")))
}

/// Deletes a profile. Deleting a missing profile succeeds.
pub async fn delete_profile<S: ProfileStore>(
    State(state): State<Arc<AppState<S>>>,
    user_id: Result<Path<String>, PathRejection>,
) -> ServerResult<Json<DeleteProfileResponse>> {
    let Path(user_id) = user_id?;
    state.store.delete_profile(&user_id).await?;

    tracing::info!(user_id = %user_id, "Profile deleted");

    Ok(Json(DeleteProfileResponse::deleted(&user_id)))
}
