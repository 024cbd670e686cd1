//! Client error types.

use entities::UserProfile;
use thiserror::Error;

/// Errors from a single round-trip to the profile server.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Server error {status}: {message}")]
    Server {
        status: u16,
        code: Option<i32>,
        message: String,
    },

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl ClientError {
    /// Returns true if the server reported no matching record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Returns true if the round-trip did not finish in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout(e.to_string())
        } else if e.is_decode() {
            ClientError::Deserialization(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by [`crate::ProfileSync`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// Loading the profile failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The preference edit breaks a selection rule; nothing was sent.
    #[error("Invalid preferences: {0}")]
    InvalidPreferences(String),

    /// The caller's identity token could not be read.
    #[error("Identity error: {0}")]
    Identity(#[from] auth::AuthError),

    /// Saving failed. The attempted profile is kept for a retry.
    #[error("Save failed: {source}")]
    SaveFailed {
        #[source]
        source: ClientError,
        pending: Box<UserProfile>,
    },

    /// There is no pending edit to retry.
    #[error("No pending edit")]
    NothingPending,
}

impl SyncError {
    /// Returns true for "record not found yet", which callers treat as benign.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Client(e) if e.is_not_found())
    }

    /// Returns true if a round-trip timed out, whether loading or saving.
    pub fn is_timeout(&self) -> bool {
        match self {
            SyncError::Client(e) | SyncError::SaveFailed { source: e, .. } => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns the edit that failed to save, if any.
    pub fn pending(&self) -> Option<&UserProfile> {
        match self {
            SyncError::SaveFailed { pending, .. } => Some(pending),
            _ => None,
        }
    }
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
