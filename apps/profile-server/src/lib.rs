//! Local Gigs Profile Server
//!
//! Serves the user profile store over HTTP: create, read (by user ID or
//! email), list, full-replace update and delete of profile records.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use auth::{JwtConfig, JwtManager};
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use profile_store::ProfileStore;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::state::{AppState, create_shared_state};

/// Creates the CORS layer every response passes through.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60))
}

/// Creates the application router with all routes configured.
pub fn create_app<S: ProfileStore + 'static>(state: Arc<AppState<S>>) -> Router {
    api::create_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::identity_middleware::<S>,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: ProfileStore>(config: Config, store: S) -> Arc<AppState<S>> {
    let jwt_manager = config.jwt_secret.as_ref().map(|secret| {
        let mut jwt_config = JwtConfig::new(secret);
        if let Some(issuer) = &config.jwt_issuer {
            jwt_config = jwt_config.with_issuer(issuer);
        }
        JwtManager::new(jwt_config)
    });

    create_shared_state(config, store, jwt_manager)
}

/// Serves the application on a bound listener until a shutdown signal.
pub async fn serve<S: ProfileStore + 'static>(
    listener: TcpListener,
    config: Config,
    store: S,
) -> std::io::Result<()> {
    let state = create_state(config, store);

    tracing::info!(
        identity_enabled = state.identity_enabled(),
        "Profile server ready"
    );

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
