//! Application state.

use std::sync::Arc;

use auth::JwtManager;
use profile_store::ProfileStore;

use crate::config::Config;

/// Shared application state.
///
/// The store is the only shared mutable resource; handlers keep nothing
/// between requests.
pub struct AppState<S: ProfileStore> {
    /// Server configuration.
    pub config: Config,
    /// Profile store.
    pub store: S,
    /// JWT manager (only present when identity verification is configured).
    pub jwt_manager: Option<JwtManager>,
}

impl<S: ProfileStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S, jwt_manager: Option<JwtManager>) -> Self {
        Self {
            config,
            store,
            jwt_manager,
        }
    }

    /// Returns true if identity tokens are verified.
    pub fn identity_enabled(&self) -> bool {
        self.jwt_manager.is_some()
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state from config and store.
pub fn create_shared_state<S: ProfileStore>(
    config: Config,
    store: S,
    jwt_manager: Option<JwtManager>,
) -> SharedState<S> {
    Arc::new(AppState::new(config, store, jwt_manager))
}
