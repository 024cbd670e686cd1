//! HTTP client for the profile server.

use std::time::Duration;

use async_trait::async_trait;
use entities::UserProfile;
use profile_protocol::{
    paths, CreateProfileResponse, DeleteProfileResponse, ErrorBody, ListProfilesQuery,
    ProfilePayload,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{ClientConfig, ClientError, ClientResult};

/// The profile operations as seen from a client page.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Creates a profile and returns its key.
    async fn create_profile(&self, payload: &ProfilePayload) -> ClientResult<String>;

    /// Gets a profile by user ID or email.
    async fn get_profile(&self, identifier: &str) -> ClientResult<UserProfile>;

    /// Lists profiles.
    async fn list_profiles(&self, query: ListProfilesQuery) -> ClientResult<Vec<UserProfile>>;

    /// Replaces every field of an existing profile and returns the stored copy.
    async fn update_profile(
        &self,
        user_id: &str,
        payload: &ProfilePayload,
    ) -> ClientResult<UserProfile>;

    /// Deletes a profile and returns the confirmation message.
    async fn delete_profile(&self, user_id: &str) -> ClientResult<String>;

    /// Gets the profile of the token's subject.
    async fn current_profile(&self) -> ClientResult<UserProfile>;
}

/// Client for the profile server.
#[derive(Debug, Clone)]
pub struct ProfileClient {
    /// Server URL
    server_url: String,
    /// HTTP client
    http_client: reqwest::Client,
    /// Bearer token sent with every request
    token: Option<String>,
}

impl ProfileClient {
    /// Creates a client with a per-request timeout.
    pub fn new(server_url: &str, timeout: Duration) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            http_client,
            token: None,
        })
    }

    /// Creates a client from configuration.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(&config.server_url, config.request_timeout())
    }

    /// Sets the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns the server URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    /// Sends a request and decodes a JSON success body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, "Profile server returned an error");

        Err(error_from_response(status, &body))
    }

    /// Checks that the server is up.
    pub async fn health_check(&self) -> ClientResult<()> {
        let response = self.http_client.get(self.url(paths::HEALTH)).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response.status(), ""))
        }
    }
}

/// Maps a non-2xx response to the client error taxonomy.
fn error_from_response(status: StatusCode, body: &str) -> ClientError {
    let detail = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);
    let message = detail
        .as_ref()
        .map(|d| d.message.clone())
        .unwrap_or_else(|| format!("status {status}"));

    match status {
        StatusCode::NOT_FOUND if !is_unsupported(detail.as_ref().map(|d| d.code)) => {
            ClientError::NotFound(message)
        }
        StatusCode::BAD_REQUEST => ClientError::MalformedRequest(message),
        _ => ClientError::Server {
            status: status.as_u16(),
            code: detail.map(|d| d.code),
            message,
        },
    }
}

/// An unknown route also answers 404; that is a server error, not a miss.
fn is_unsupported(code: Option<i32>) -> bool {
    code == Some(profile_protocol::error_codes::UNSUPPORTED)
}

#[async_trait]
impl ProfileApi for ProfileClient {
    async fn create_profile(&self, payload: &ProfilePayload) -> ClientResult<String> {
        let request = self.http_client.post(self.url(paths::USERS)).json(payload);
        let response: CreateProfileResponse = self.send(request).await?;
        Ok(response.user_id)
    }

    async fn get_profile(&self, identifier: &str) -> ClientResult<UserProfile> {
        let request = self.http_client.get(self.url(&paths::user(identifier)));
        self.send(request).await
    }

    async fn list_profiles(&self, query: ListProfilesQuery) -> ClientResult<Vec<UserProfile>> {
        let request = self.http_client.get(self.url(paths::USERS)).query(&query);
        self.send(request).await
    }

    async fn update_profile(
        &self,
        user_id: &str,
        payload: &ProfilePayload,
    ) -> ClientResult<UserProfile> {
        let request = self
            .http_client
            .put(self.url(&paths::user(user_id)))
            .json(payload);
        self.send(request).await
    }

    async fn delete_profile(&self, user_id: &str) -> ClientResult<String> {
        let request = self.http_client.delete(self.url(&paths::user(user_id)));
        let response: DeleteProfileResponse = self.send(request).await?;
        Ok(response.message)
    }

    async fn current_profile(&self) -> ClientResult<UserProfile> {
        let request = self.http_client.get(self.url(paths::CURRENT_USER));
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use profile_protocol::{error_codes, ErrorCode};

    use super::*;

    fn body(code: ErrorCode, message: &str) -> String {
        serde_json::to_string(&ErrorBody::new(code, message)).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let err = error_from_response(
            StatusCode::NOT_FOUND,
            &body(ErrorCode::NotFound, "UserProfile not found: u1"),
        );
        assert!(matches!(err, ClientError::NotFound(ref m) if m.contains("u1")));

        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            &body(ErrorCode::MalformedRequest, "userID is required"),
        );
        assert!(matches!(err, ClientError::MalformedRequest(_)));

        let err = error_from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &body(ErrorCode::StorageFault, "disk full"),
        );
        assert!(matches!(
            err,
            ClientError::Server { status: 500, code: Some(error_codes::STORAGE_FAULT), ref message }
                if message == "disk full"
        ));
    }

    #[test]
    fn test_unknown_route_is_not_a_miss() {
        let err = error_from_response(
            StatusCode::NOT_FOUND,
            &body(ErrorCode::Unsupported, "Unsupported route: GET /nope"),
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_non_json_error_body() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, ClientError::Server { status: 502, code: None, .. }));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ProfileClient::new("http://localhost:54880/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.server_url(), "http://localhost:54880");
        assert_eq!(client.url(&paths::user("u1")), "http://localhost:54880/users/u1");
    }
}
