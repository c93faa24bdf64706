//! Token file handling for Google Drive
//!
//! drivepath does not run the interactive consent flow. It expects a token
//! file written by a previous authorization (the layout google-auth produces
//! is accepted) and refreshes the access token when it has expired.
//!
//! ## Components
//!
//! - [`TokenFile`] - Stored access/refresh token pair with expiry
//! - [`ClientCredentials`] - OAuth client parsed from a Google `credentials.json`
//! - [`refresh_access_token`] - Refresh-token exchange at the token URI
//! - [`ensure_fresh_token`] - Load, refresh when needed, persist, return the access token

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use oauth2::{
    basic::BasicClient, AuthType, ClientId, ClientSecret, RefreshToken, Scope, TokenResponse,
    TokenUrl,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

/// Google OAuth2 token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens expiring within this many seconds are refreshed early
const EXPIRY_MARGIN_SECS: i64 = 60;

// ============================================================================
// TokenFile
// ============================================================================

/// Persisted OAuth tokens
///
/// Field aliases accept the layout written by google-auth (`token`, `expiry`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFile {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        alias = "expiry",
        deserialize_with = "deserialize_expiry",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
}

/// Accepts RFC 3339 timestamps and naive ones, read as UTC
fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|n| n.and_utc())
        })
}

fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_expiry))
}

impl TokenFile {
    /// Reads a token file
    ///
    /// # Errors
    /// Returns an error naming the expected location when the file is missing,
    /// or when it is not valid token JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "No token file at {}. Authorize drivepath once with your OAuth client \
                 and place the resulting token JSON there (or pass --token).",
                path.display()
            );
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse token file: {}", path.display()))
    }

    /// Writes the token file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to encode token file")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write token file: {}", path.display()))?;
        debug!(path = %path.display(), "Saved token file");
        Ok(())
    }

    /// Whether the access token is expired, or about to be, at `now`
    ///
    /// A token without an expiry is treated as valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| at <= now + Duration::seconds(EXPIRY_MARGIN_SECS))
    }

    /// Client credentials embedded in the token file, if complete
    pub fn embedded_credentials(&self) -> Option<ClientCredentials> {
        Some(ClientCredentials {
            client_id: self.client_id.clone()?,
            client_secret: self.client_secret.clone()?,
            token_uri: self
                .token_uri
                .clone()
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}

// ============================================================================
// ClientCredentials
// ============================================================================

/// OAuth client identity used for the refresh exchange
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Top level of a Google `credentials.json`
#[derive(Debug, Deserialize)]
struct CredentialsDocument {
    installed: Option<ClientCredentials>,
    web: Option<ClientCredentials>,
}

impl ClientCredentials {
    /// Parses a Google `credentials.json` (`installed` or `web` client)
    pub fn from_json(json: &str) -> Result<Self> {
        let document: CredentialsDocument =
            serde_json::from_str(json).context("Invalid credentials JSON")?;
        document
            .installed
            .or(document.web)
            .context("Credentials JSON has neither an \"installed\" nor a \"web\" client")
    }

    /// Reads and parses a Google `credentials.json`
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse credentials file: {}", path.display()))
    }
}

// ============================================================================
// Refresh
// ============================================================================

/// Exchanges a refresh token for a new access token
///
/// # Arguments
/// * `tokens` - Current tokens; must carry a refresh token
/// * `credentials` - OAuth client used for the exchange
/// * `scope` - Scope to request, or `None` to keep the granted one
///
/// # Returns
/// Updated tokens. The refresh token is kept when the server does not rotate it.
pub async fn refresh_access_token(
    tokens: &TokenFile,
    credentials: &ClientCredentials,
    scope: Option<&str>,
) -> Result<TokenFile> {
    let refresh_token = tokens
        .refresh_token
        .as_deref()
        .context("Access token expired and the token file has no refresh token")?;

    info!(token_uri = %credentials.token_uri, "Refreshing access token");

    let client = BasicClient::new(ClientId::new(credentials.client_id.clone()))
        .set_client_secret(ClientSecret::new(credentials.client_secret.clone()))
        .set_auth_type(AuthType::RequestBody)
        .set_token_uri(
            TokenUrl::new(credentials.token_uri.clone()).context("Invalid token URI")?,
        );

    let http_client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Failed to build HTTP client")?;

    let refresh = RefreshToken::new(refresh_token.to_string());
    let mut request = client.exchange_refresh_token(&refresh);
    if let Some(scope) = scope {
        request = request.add_scope(Scope::new(scope.to_string()));
    }
    let token_result = request
        .request_async(&http_client)
        .await
        .context("Failed to refresh token")?;

    let expires_at = token_result
        .expires_in()
        .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
        .unwrap_or_else(|| Utc::now() + Duration::hours(1));

    Ok(TokenFile {
        access_token: token_result.access_token().secret().to_string(),
        refresh_token: token_result
            .refresh_token()
            .map(|t| t.secret().to_string())
            .or_else(|| Some(refresh_token.to_string())),
        expires_at: Some(expires_at),
        ..tokens.clone()
    })
}

/// Returns a usable access token, refreshing and persisting it when expired
///
/// Client credentials come from the token file when it embeds them, otherwise
/// from `credentials_file`.
pub async fn ensure_fresh_token(
    credentials_file: &Path,
    token_file: &Path,
    scope: Option<&str>,
) -> Result<String> {
    let tokens = TokenFile::load(token_file)?;
    if !tokens.is_expired(Utc::now()) {
        debug!(path = %token_file.display(), "Stored access token is still valid");
        return Ok(tokens.access_token);
    }

    let credentials = match tokens.embedded_credentials() {
        Some(credentials) => credentials,
        None => ClientCredentials::load(credentials_file)?,
    };
    let refreshed = refresh_access_token(&tokens, &credentials, scope).await?;
    refreshed.save(token_file)?;
    info!("Access token refreshed");
    Ok(refreshed.access_token)
}
