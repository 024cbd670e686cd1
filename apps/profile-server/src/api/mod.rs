//! API endpoints.

pub mod profile;

use std::sync::Arc;

use axum::{
    Router,
    http::{Method, Uri},
    routing::{MethodFilter, MethodRouter, get, on},
};
use profile_protocol::paths;
use profile_store::ProfileStore;

use crate::error::ServerError;
use crate::state::AppState;

/// Operations of the profile API, each bound to one method and path shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileRoute {
    /// `GET /users`
    List,
    /// `POST /users`
    Create,
    /// `PUT /users`, key in the body
    ReplaceByBody,
    /// `GET /users/me`
    Current,
    /// `GET /users/:id`
    Get,
    /// `PUT /users/:id`, key in the path
    ReplaceByPath,
    /// `DELETE /users/:id`
    Delete,
}

impl ProfileRoute {
    /// Every route, in registration order.
    pub const ALL: [ProfileRoute; 7] = [
        ProfileRoute::List,
        ProfileRoute::Create,
        ProfileRoute::ReplaceByBody,
        ProfileRoute::Current,
        ProfileRoute::Get,
        ProfileRoute::ReplaceByPath,
        ProfileRoute::Delete,
    ];

    /// Path pattern the route is registered under.
    pub fn path(self) -> &'static str {
        match self {
            ProfileRoute::List | ProfileRoute::Create | ProfileRoute::ReplaceByBody => paths::USERS,
            ProfileRoute::Current => paths::CURRENT_USER,
            ProfileRoute::Get | ProfileRoute::ReplaceByPath | ProfileRoute::Delete => {
                paths::USER_BY_ID
            }
        }
    }

    /// HTTP method of the route.
    pub fn method(self) -> Method {
        match self {
            ProfileRoute::List | ProfileRoute::Current | ProfileRoute::Get => Method::GET,
            ProfileRoute::Create => Method::POST,
            ProfileRoute::ReplaceByBody | ProfileRoute::ReplaceByPath => Method::PUT,
            ProfileRoute::Delete => Method::DELETE,
        }
    }

    fn method_filter(self) -> MethodFilter {
        match self {
            ProfileRoute::List | ProfileRoute::Current | ProfileRoute::Get => MethodFilter::GET,
            ProfileRoute::Create => MethodFilter::POST,
            ProfileRoute::ReplaceByBody | ProfileRoute::ReplaceByPath => MethodFilter::PUT,
            ProfileRoute::Delete => MethodFilter::DELETE,
        }
    }

    /// Binds the route's handler.
    fn handler<S: ProfileStore + 'static>(self) -> MethodRouter<Arc<AppState<S>>> {
        let filter = self.method_filter();
        match self {
            ProfileRoute::List => on(filter, profile::list_profiles::<S>),
            ProfileRoute::Create => on(filter, profile::create_profile::<S>),
            ProfileRoute::ReplaceByBody => on(filter, profile::replace_profile_by_body::<S>),
            ProfileRoute::Current => on(filter, profile::get_current_profile::<S>),
            ProfileRoute::Get => on(filter, profile::get_profile::<S>),
            ProfileRoute::ReplaceByPath => on(filter, profile::replace_profile_by_path::<S>),
            ProfileRoute::Delete => on(filter, profile::delete_profile::<S>),
        }
    }
}

/// Creates the API router from the route table.
pub fn create_router<S: ProfileStore + 'static>() -> Router<Arc<AppState<S>>> {
    let mut router = Router::new();

    for path in [paths::USERS, paths::CURRENT_USER, paths::USER_BY_ID] {
        let method_router = ProfileRoute::ALL
            .into_iter()
            .filter(|route| route.path() == path)
            .fold(MethodRouter::new(), |acc, route| acc.merge(route.handler::<S>()))
            .fallback(method_not_allowed);

        router = router.route(path, method_router);
    }

    router
        .route(paths::HEALTH, get(health_check))
        .fallback(unsupported_route)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Known path, unhandled method.
async fn method_not_allowed(method: Method, uri: Uri) -> ServerError {
    ServerError::MethodNotAllowed(format!("{method} {}", uri.path()))
}

/// Unknown path.
async fn unsupported_route(method: Method, uri: Uri) -> ServerError {
    ServerError::UnsupportedRoute(format!("{method} {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_route_table_has_unique_bindings() {
        let bindings: HashSet<(&str, Method)> = ProfileRoute::ALL
            .into_iter()
            .map(|route| (route.path(), route.method()))
            .collect();

        assert_eq!(bindings.len(), ProfileRoute::ALL.len());
    }

    #[test]
    fn test_both_replace_variants_are_put() {
        assert_eq!(ProfileRoute::ReplaceByBody.method(), Method::PUT);
        assert_eq!(ProfileRoute::ReplaceByPath.method(), Method::PUT);
        assert_ne!(
            ProfileRoute::ReplaceByBody.path(),
            ProfileRoute::ReplaceByPath.path()
        );
    }
}
