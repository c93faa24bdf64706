//! Google Drive v3 API client
//!
//! Provides a typed HTTP client for the Drive v3 REST API. Handles the
//! bearer header, endpoint construction and status classification.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use drivepath_gdrive::client::DriveClient;
//! use reqwest::Method;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DriveClient::new("access-token-here");
//! let response = client
//!     .send(client.request(Method::GET, "/files/root").query(&[("fields", "id")]))
//!     .await?;
//! println!("{}", response.text().await?);
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::debug;

use drivepath_core::config::{DEFAULT_API_BASE_URL, DEFAULT_UPLOAD_BASE_URL};

use crate::{parse_retry_after, DriveError};

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for Google Drive API calls
///
/// Wraps `reqwest::Client` with the bearer header and the two Drive base
/// URLs: one for metadata calls, one for media uploads.
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for metadata requests
    api_base_url: String,
    /// Base URL for media uploads
    upload_base_url: String,
    /// Current OAuth2 access token
    access_token: String,
}

impl DriveClient {
    /// Creates a new DriveClient against the public Drive endpoints
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token for the Drive scope
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_endpoints(access_token, DEFAULT_API_BASE_URL, DEFAULT_UPLOAD_BASE_URL)
    }

    /// Creates a new DriveClient with explicit metadata and upload base URLs
    ///
    /// Trailing slashes are trimmed.
    pub fn with_endpoints(
        access_token: impl Into<String>,
        api_base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            upload_base_url: upload_base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Creates a new DriveClient rooted at a single base URL (useful for testing)
    ///
    /// Metadata calls go to `base_url`, uploads to `base_url/upload`.
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        let upload = format!("{}/upload", base.trim_end_matches('/'));
        Self::with_endpoints(access_token, base, upload)
    }

    /// Updates the access token (e.g., after a token refresh)
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
        debug!("Updated DriveClient access token");
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn upload_base_url(&self) -> &str {
        &self.upload_base_url
    }

    /// Creates an authenticated request builder against the metadata API
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g., "/files")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request builder against the upload API
    pub fn upload_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Sends a request and turns unsuccessful statuses into [`DriveError`]
    ///
    /// No retries are attempted.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, DriveError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Drive request failed");
        Err(DriveError::from_status(status, retry_after, &body))
    }
}
