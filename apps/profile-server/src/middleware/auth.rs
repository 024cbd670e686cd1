//! Identity middleware.

use std::sync::Arc;

use auth::{AuthenticatedUser, JwtManager};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use profile_store::ProfileStore;

use crate::error::ServerError;
use crate::state::AppState;

/// Extracts the bearer token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Validates a token and converts its claims into the caller identity.
fn authenticate(jwt_manager: &JwtManager, token: &str) -> Result<AuthenticatedUser, ServerError> {
    let claims = jwt_manager.validate_token(token)?;
    Ok(AuthenticatedUser::try_from(claims)?)
}

/// Identity middleware.
///
/// Requests without a bearer token pass through anonymously. A token that is
/// present must verify; the resulting identity is stored in the request
/// extensions. Without a configured JWT secret, tokens are ignored.
pub async fn identity_middleware<S: ProfileStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(jwt_manager) = &state.jwt_manager else {
        return next.run(request).await;
    };

    let Some(token) = extract_token(&request) else {
        return next.run(request).await;
    };

    match authenticate(jwt_manager, token) {
        Ok(user) => {
            tracing::debug!(subject = %user.id, "Caller identity verified");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected identity token");
            e.into_response()
        }
    }
}
