//! Scp command - Copy one file between the drive and the local filesystem
//!
//! Remote paths carry a `drive:` prefix; exactly one side must be remote.
//!
//! ```text
//! drivepath scp drive:/reports/q1.csv ./q1.csv     # download
//! drivepath scp ./q1.csv drive:/reports/           # upload into a folder
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use drivepath_core::domain::RemotePath;
use drivepath_core::usecases::DriveFilesystem;

use super::context::{parse_remote, require_existing, CliContext};

/// Prefix marking a remote path on the command line
pub const REMOTE_PREFIX: &str = "drive:";

/// Arguments for `drivepath scp`
#[derive(Debug, Args)]
pub struct ScpCommand {
    /// Source (`drive:/path` for remote)
    pub source: String,
    /// Destination (`drive:/path` for remote)
    pub destination: String,
}

/// Direction of a copy, decided from the prefixes
#[derive(Debug, PartialEq, Eq)]
pub enum Transfer {
    Download { remote: RemotePath, local: PathBuf },
    Upload { local: PathBuf, remote: RemotePath },
}

/// Splits the two operands into a transfer
///
/// # Errors
/// Both or neither side remote, or an invalid remote path
pub fn plan(source: &str, destination: &str) -> Result<Transfer> {
    match (
        source.strip_prefix(REMOTE_PREFIX),
        destination.strip_prefix(REMOTE_PREFIX),
    ) {
        (Some(remote), None) => Ok(Transfer::Download {
            remote: parse_remote(remote)?,
            local: PathBuf::from(destination),
        }),
        (None, Some(remote)) => Ok(Transfer::Upload {
            local: PathBuf::from(source),
            remote: parse_remote(trim_trailing_slash(remote))?,
        }),
        (Some(_), Some(_)) => bail!("Both paths are remote; one side must be local"),
        (None, None) => bail!("Neither path is remote; prefix one side with '{REMOTE_PREFIX}'"),
    }
}

/// Drops a trailing slash from a remote folder operand, keeping "/" intact
fn trim_trailing_slash(raw: &str) -> &str {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() && raw.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

impl ScpCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let transfer = plan(&self.source, &self.destination)?;
        let mut fs = ctx.open_filesystem().await?;
        let formatter = ctx.formatter();

        match transfer {
            Transfer::Download { remote, local } => {
                require_existing(&mut fs, &remote).await?;
                let target = local_target(&local, &remote);
                let bytes = fs.download(&remote, &target).await?;

                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "success": true,
                        "remote": remote.as_str(),
                        "local": target.display().to_string(),
                        "bytes": bytes,
                    }));
                } else {
                    formatter.success(&format!(
                        "{remote} -> {} ({bytes} bytes)",
                        target.display()
                    ));
                }
            }
            Transfer::Upload { local, remote } => {
                let target = remote_target(&mut fs, &local, remote).await?;
                let record = fs.upload(&local, &target).await?;

                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "success": true,
                        "local": local.display().to_string(),
                        "record": &*record,
                    }));
                } else {
                    formatter.success(&format!("{} -> {}", local.display(), record.path()));
                }
            }
        }
        Ok(())
    }
}

/// A local directory receives the file under its remote name
fn local_target(local: &Path, remote: &RemotePath) -> PathBuf {
    match remote.file_name() {
        Some(name) if local.is_dir() => local.join(name),
        _ => local.to_path_buf(),
    }
}

/// A remote directory receives the file under its local name
async fn remote_target(
    fs: &mut DriveFilesystem,
    local: &Path,
    remote: RemotePath,
) -> Result<RemotePath> {
    if !fs.locate(&remote).await? {
        return Ok(remote);
    }
    let is_dir = fs.index().get_by_path(&remote)?.is_dir();
    if !is_dir {
        return Ok(remote);
    }

    let name = local
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Cannot derive a remote name from {}", local.display()))?;
    Ok(remote.join(name)?)
}
