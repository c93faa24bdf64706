//! Configuration module for drivepath.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default Drive v3 metadata endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Default Drive v3 media upload endpoint.
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Largest page the store accepts for a children listing.
pub const MAX_PAGE_SIZE: u32 = 1000;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for drivepath.
///
/// Every section may be omitted from the YAML file; missing values take
/// their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub transfer: TransferConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Remote store access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Maximum number of children requested per listing call.
    pub page_size: u32,
    /// Follow `nextPageToken` until a listing is exhausted instead of
    /// stopping after the first page.
    pub follow_next_page: bool,
    /// Base URL of the metadata API.
    pub api_base_url: String,
    /// Base URL of the media upload API.
    pub upload_base_url: String,
}

/// Local transfer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Size of the local write buffer used by downloads (in KiB).
    pub download_chunk_kb: u32,
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// OAuth client credentials downloaded from the cloud console.
    pub credentials_file: PathBuf,
    /// Stored access/refresh token.
    pub token_file: PathBuf,
    /// Scope to narrow a refreshed token to; unset keeps the granted scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/drivepath/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("drivepath")
            .join("config.yaml")
    }

    /// Download write buffer size in bytes.
    pub fn download_chunk_bytes(&self) -> usize {
        self.transfer.download_chunk_kb as usize * 1024
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            page_size: 500,
            follow_next_page: false,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            download_chunk_kb: 1024,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("credentials.json"),
            token_file: PathBuf::from("token.json"),
            scope: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"remote.page_size"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn check_http_url(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(value) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        Ok(parsed) => errors.push(ValidationError {
            field: field.into(),
            message: format!("unsupported scheme '{}'", parsed.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field: field.into(),
            message: format!("invalid URL '{value}': {e}"),
        }),
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- remote ---
        if self.remote.page_size == 0 || self.remote.page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError {
                field: "remote.page_size".into(),
                message: format!("must be in range 1..={MAX_PAGE_SIZE}"),
            });
        }
        check_http_url("remote.api_base_url", &self.remote.api_base_url, &mut errors);
        check_http_url(
            "remote.upload_base_url",
            &self.remote.upload_base_url,
            &mut errors,
        );

        // --- transfer ---
        if self.transfer.download_chunk_kb == 0 {
            errors.push(ValidationError {
                field: "transfer.download_chunk_kb".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- auth ---
        if self.auth.credentials_file.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "auth.credentials_file".into(),
                message: "must not be empty".into(),
            });
        }
        if self.auth.token_file.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "auth.token_file".into(),
                message: "must not be empty".into(),
            });
        }
        if self
            .auth
            .scope
            .as_deref()
            .is_some_and(|scope| scope.trim().is_empty())
        {
            errors.push(ValidationError {
                field: "auth.scope".into(),
                message: "must not be empty".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use drivepath_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .remote_page_size(100)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- remote ---

    pub fn remote_page_size(mut self, page_size: u32) -> Self {
        self.config.remote.page_size = page_size;
        self
    }

    pub fn remote_follow_next_page(mut self, follow: bool) -> Self {
        self.config.remote.follow_next_page = follow;
        self
    }

    pub fn remote_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.api_base_url = url.into();
        self
    }

    pub fn remote_upload_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.upload_base_url = url.into();
        self
    }

    // --- transfer ---

    pub fn transfer_download_chunk_kb(mut self, kb: u32) -> Self {
        self.config.transfer.download_chunk_kb = kb;
        self
    }

    // --- auth ---

    pub fn auth_credentials_file(mut self, path: PathBuf) -> Self {
        self.config.auth.credentials_file = path;
        self
    }

    pub fn auth_token_file(mut self, path: PathBuf) -> Self {
        self.config.auth.token_file = path;
        self
    }

    pub fn auth_scope(mut self, scope: impl Into<String>) -> Self {
        self.config.auth.scope = Some(scope.into());
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
