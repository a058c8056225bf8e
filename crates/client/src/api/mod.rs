//! REST client for the task manager backend.
//!
//! # Endpoints
//!
//! - `auth`: register and login (unauthenticated)
//! - `tasks`: the caller's own tasks
//! - `admin`: user and task management, statistics (ADMIN role)
//!
//! Every request carries `Authorization: Bearer <token>` while the shared
//! [`SessionStore`] holds a token. The client never logs out on its own: a
//! 401/403 is surfaced as [`ApiError::Unauthorized`] and the caller decides.

mod admin;
mod auth;
mod error;
mod tasks;

pub use auth::LoginOutcome;
pub use error::ApiError;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::session::SessionStore;

/// Task manager API client.
///
/// Cheap to clone; clones share the HTTP connection pool and the session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("taskmanager-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                session,
            }),
        })
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.inner.session
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Validation(format!("Invalid request path {path}: {e}")))
    }

    /// Start a request, attaching the bearer token if the session has one.
    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        let builder = self.inner.client.request(method, url);
        Ok(match self.inner.session.token().await {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    /// Execute a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).await?.send().await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::POST, path)
            .await?
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a PUT request with a JSON body.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::PUT, path)
            .await?
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a DELETE request. Any success body is ignored.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, path).await?.send().await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        if response.status().is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body)
                .map_err(|e| ApiError::Decode(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Turn a non-2xx response into an error, keeping the server's message.
    async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);
        debug!(status = status.as_u16(), error = %error, "API request rejected");
        error
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
