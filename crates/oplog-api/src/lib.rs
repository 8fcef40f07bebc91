//! OpenProject API client.
//!
//! One method, one request: [`Client::submit`] POSTs a pre-serialized
//! time-entry document and reports whatever the server answered. Any HTTP
//! status, 4xx and 5xx included, comes back as a [`SubmissionResponse`];
//! the operator reads the status codes off the output. Only transport-level
//! problems are errors.

use std::fmt;

use thiserror::Error;

/// Fixed Basic Auth username; the API key travels as the password.
const BASIC_AUTH_USER: &str = "apikey";

/// API client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Whatever the server said: status code plus raw response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResponse {
    pub status: u16,
    pub body: String,
}

/// OpenProject client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across tasks. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the given endpoint with the given API key.
    ///
    /// No request timeout is configured: a submission runs until the server
    /// answers or the transport fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ApiError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(ApiError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(ApiError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            http,
            url: url.into(),
            api_key,
        })
    }

    /// Submits one serialized time-entry document.
    ///
    /// Exactly one outbound call; no retries. The response status is data,
    /// not an error, whatever its class.
    pub async fn submit(&self, body: String) -> Result<SubmissionResponse, ApiError> {
        let response = self
            .http
            .post(&self.url)
            .basic_auth(BASIC_AUTH_USER, Some(&self.api_key))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(SubmissionResponse { status, body })
    }
}
