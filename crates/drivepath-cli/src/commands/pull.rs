//! Pull command - Download the files of a remote directory
//!
//! Files land directly in the local directory. With `--recursive`, remote
//! subdirectories are mirrored as local subdirectories. With `--only-new`, a
//! local copy newer than the remote modification time is left alone.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use tracing::{debug, info};

use super::context::{parse_remote, require_existing, CliContext};

/// Arguments for `drivepath pull`
#[derive(Debug, Args)]
pub struct PullCommand {
    /// Remote directory to download from
    pub remote_dir: String,
    /// Local directory to download into (created if missing)
    pub local_dir: PathBuf,
    /// Descend into remote subdirectories
    #[arg(short, long)]
    pub recursive: bool,
    /// Skip files whose local copy is newer than the remote one
    #[arg(long)]
    pub only_new: bool,
}

/// Whether the local copy at `local` is newer than `remote_modified`
///
/// Missing local files and remote records without a time are never skipped.
pub fn local_is_newer(local: &Path, remote_modified: Option<&DateTime<Utc>>) -> bool {
    let Some(remote_modified) = remote_modified else {
        return false;
    };
    std::fs::metadata(local)
        .and_then(|m| m.modified())
        .map(|t| DateTime::<Utc>::from(t) > *remote_modified)
        .unwrap_or(false)
}

impl PullCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let root = parse_remote(&self.remote_dir)?;
        let mut fs = ctx.open_filesystem().await?;
        let formatter = ctx.formatter();

        require_existing(&mut fs, &root).await?;
        if !fs.index().get_by_path(&root)?.is_dir() {
            anyhow::bail!("Not a directory: {root}");
        }

        let mut downloaded: Vec<String> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();
        let mut total_bytes: u64 = 0;
        let mut queue = VecDeque::from([(root, self.local_dir.clone())]);

        while let Some((remote_dir, local_dir)) = queue.pop_front() {
            tokio::fs::create_dir_all(&local_dir)
                .await
                .with_context(|| format!("Failed to create {}", local_dir.display()))?;

            let mut children = fs.ls(&remote_dir).await?;
            children.sort_by(|a, b| a.name().cmp(b.name()));

            for child in children {
                let local_path = local_dir.join(child.name());
                if child.is_dir() {
                    if self.recursive {
                        queue.push_back((child.path().clone(), local_path));
                    }
                    continue;
                }

                if self.only_new && local_is_newer(&local_path, child.modified_time()) {
                    debug!(path = %child.path(), "Local copy is newer, skipping");
                    formatter.warn(&format!(
                        "Skipping {}, the local file is newer",
                        child.path()
                    ));
                    skipped.push(child.path().to_string());
                    continue;
                }

                formatter.info(&format!("Downloading {}", child.path()));
                total_bytes += fs.download(child.path(), &local_path).await?;
                downloaded.push(child.path().to_string());
            }
        }

        info!(
            files = downloaded.len(),
            skipped = skipped.len(),
            bytes = total_bytes,
            "Pull finished"
        );

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "downloaded": downloaded,
                "skipped": skipped,
                "bytes": total_bytes,
            }));
        } else {
            formatter.success(&format!(
                "Downloaded {} file{} ({} bytes), skipped {}",
                downloaded.len(),
                if downloaded.len() == 1 { "" } else { "s" },
                total_bytes,
                skipped.len()
            ));
        }
        Ok(())
    }
}
