//! Shared command context: global options, configuration and the drive session

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use drivepath_core::config::Config;
use drivepath_core::domain::RemotePath;
use drivepath_core::usecases::{DriveFilesystem, FilesystemOptions};
use drivepath_gdrive::auth::ensure_fresh_token;
use drivepath_gdrive::client::DriveClient;
use drivepath_gdrive::provider::GoogleDriveStore;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Global options every command runs with
#[derive(Debug)]
pub struct CliContext {
    pub format: OutputFormat,
    explicit_config: Option<PathBuf>,
    creds: Option<PathBuf>,
    token: Option<PathBuf>,
}

impl CliContext {
    pub fn new(
        format: OutputFormat,
        explicit_config: Option<PathBuf>,
        creds: Option<PathBuf>,
        token: Option<PathBuf>,
    ) -> Self {
        Self {
            format,
            explicit_config,
            creds,
            token,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.is_json())
    }

    /// Path of the configuration file in effect
    pub fn config_path(&self) -> PathBuf {
        self.explicit_config
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    /// Loads the configuration
    ///
    /// A file named with `--config` must exist and parse; the default
    /// location falls back to built-in defaults.
    pub fn config(&self) -> Result<Config> {
        match &self.explicit_config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load configuration: {}", path.display())),
            None => Ok(Config::load_or_default(&Config::default_path())),
        }
    }

    /// Authenticates and returns a filesystem with an empty cache
    ///
    /// # Errors
    /// Fails on invalid configuration, a missing or unrefreshable token, or
    /// unreadable credentials
    pub async fn open_filesystem(&self) -> Result<DriveFilesystem> {
        let config = self.config()?;
        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            bail!("Invalid configuration: {}", messages.join("; "));
        }

        let credentials_file = self
            .creds
            .clone()
            .unwrap_or_else(|| config.auth.credentials_file.clone());
        let token_file = self
            .token
            .clone()
            .unwrap_or_else(|| config.auth.token_file.clone());
        debug!(
            credentials = %credentials_file.display(),
            token = %token_file.display(),
            "Loading access token"
        );

        let scope = config.auth.scope.as_deref();
        let access_token = ensure_fresh_token(&credentials_file, &token_file, scope).await?;

        let client = DriveClient::with_endpoints(
            access_token,
            config.remote.api_base_url.clone(),
            config.remote.upload_base_url.clone(),
        );
        let store = Arc::new(GoogleDriveStore::new(client));
        let options = FilesystemOptions::from(&config);
        info!(
            page_size = options.page_size,
            follow_next_page = options.follow_next_page,
            "Opened drive session"
        );

        Ok(DriveFilesystem::new(store).with_options(options))
    }
}

/// Parses a command-line remote path
pub fn parse_remote(raw: &str) -> Result<RemotePath> {
    RemotePath::new(raw.to_string()).with_context(|| format!("Invalid remote path: {raw}"))
}

/// Resolves `path` and fails when nothing exists there
pub async fn require_existing(fs: &mut DriveFilesystem, path: &RemotePath) -> Result<()> {
    if !fs.locate(path).await? {
        bail!("Not found: {path}");
    }
    Ok(())
}
