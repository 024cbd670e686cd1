//! Server error types.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use profile_protocol::{ErrorBody, ErrorCode};
use profile_store::ProfileStoreError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Request body or query could not be parsed.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// No record matched.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Path not handled.
    #[error("Unsupported route: {0}")]
    UnsupportedRoute(String),

    /// Path handled, method not.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// A verified identity is required.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Identity token rejected.
    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    /// The backing store failed.
    #[error("Storage fault: {0}")]
    StorageFault(ProfileStoreError),
}

impl From<ProfileStoreError> for ServerError {
    fn from(e: ProfileStoreError) -> Self {
        if e.is_not_found() {
            ServerError::NotFound(e.to_string())
        } else {
            ServerError::StorageFault(e)
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::MalformedRequest(rejection.body_text())
    }
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            ServerError::MalformedRequest(_) => (StatusCode::BAD_REQUEST, ErrorCode::MalformedRequest),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            ServerError::UnsupportedRoute(_) => (StatusCode::NOT_FOUND, ErrorCode::Unsupported),
            ServerError::MethodNotAllowed(_) => {
                (StatusCode::METHOD_NOT_ALLOWED, ErrorCode::Unsupported)
            }
            ServerError::AuthenticationRequired | ServerError::Auth(_) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized)
            }
            ServerError::StorageFault(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::StorageFault)
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (status, Json(ErrorBody::new(code, self.to_string()))).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
