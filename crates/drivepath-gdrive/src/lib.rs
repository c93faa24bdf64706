//! drivepath gdrive - Google Drive v3 adapter
//!
//! Provides an async client for:
//! - Children listing, metadata, create, patch and media download calls
//! - Multipart upload of file content
//! - Token file handling and refresh-token exchange
//!
//! ## Modules
//!
//! - [`auth`] - Token file, client credentials and access token refresh
//! - [`client`] - Drive v3 HTTP client
//! - [`provider`] - [`provider::GoogleDriveStore`], the remote store port implementation

pub mod auth;
pub mod client;
pub mod provider;

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// MIME type Drive uses to mark folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Errors that can occur when communicating with the Google Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions or quota for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Delay requested by the server, if any
        retry_after: Option<Duration>,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other unsuccessful status
    #[error("HTTP {status}: {message}")]
    Status {
        /// Numeric HTTP status
        status: u16,
        /// Message extracted from the error body
        message: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Error body returned by Google APIs
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pull the human-readable message out of a Google error body
///
/// Falls back to the raw body when it is not the usual JSON envelope.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.trim().to_string())
}

impl DriveError {
    /// Classify an unsuccessful response
    ///
    /// # Arguments
    /// * `status` - HTTP status of the response
    /// * `retry_after` - Parsed `Retry-After` header, if any
    /// * `body` - Raw response body
    pub fn from_status(status: StatusCode, retry_after: Option<Duration>, body: &str) -> Self {
        let message = error_message(body);
        match status {
            StatusCode::UNAUTHORIZED => DriveError::Unauthorized(message),
            StatusCode::FORBIDDEN => DriveError::Forbidden(message),
            StatusCode::NOT_FOUND => DriveError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => DriveError::TooManyRequests { retry_after },
            s if s.is_server_error() => DriveError::ServerError(message),
            s => DriveError::Status {
                status: s.as_u16(),
                message,
            },
        }
    }
}

/// Parse a `Retry-After` header given in seconds
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
