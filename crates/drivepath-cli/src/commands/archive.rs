//! Archive command - Upload a local directory into a dated remote folder
//!
//! Every regular file directly inside the local directory is uploaded to
//! `<remote-root>/<date>`. Both remote directories are created when missing
//! and files already present remotely are skipped.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use tracing::{debug, info};

use super::context::{parse_remote, CliContext};

/// Arguments for `drivepath archive`
#[derive(Debug, Args)]
pub struct ArchiveCommand {
    /// Local directory whose files are uploaded
    pub local_dir: PathBuf,
    /// Remote folder holding the dated directories
    #[arg(long, default_value = "/archive")]
    pub remote_root: String,
    /// Date used for the remote directory name (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<String>,
}

/// Validates `--date`, defaulting to today's local date
pub fn archive_date(date: Option<&str>) -> Result<String> {
    match date {
        Some(raw) => {
            let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{raw}', expected YYYY-MM-DD"))?;
            Ok(parsed.format("%Y-%m-%d").to_string())
        }
        None => Ok(Local::now().format("%Y-%m-%d").to_string()),
    }
}

/// Regular files directly inside `dir`, sorted by name
pub fn files_to_upload(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Not a local directory: {}", dir.display());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl ArchiveCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let root = parse_remote(&self.remote_root)?;
        let dated = root.join(&archive_date(self.date.as_deref())?)?;
        let files = files_to_upload(&self.local_dir)?;

        let mut fs = ctx.open_filesystem().await?;
        let formatter = ctx.formatter();

        for dir in [&root, &dated] {
            if !fs.locate(dir).await? {
                fs.mkdir(dir).await?;
                formatter.info(&format!("Created {dir}"));
            }
        }

        let mut uploaded: Vec<String> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();
        for local in &files {
            let Some(name) = local.file_name().and_then(|n| n.to_str()) else {
                formatter.warn(&format!("Skipping {}, name is not UTF-8", local.display()));
                continue;
            };
            let target = dated.join(name)?;

            if fs.locate(&target).await? {
                debug!(path = %target, "Already archived");
                formatter.warn(&format!("Skipping {target}, it already exists"));
                skipped.push(target.to_string());
                continue;
            }

            formatter.info(&format!("Uploading {}", local.display()));
            let record = fs.upload(local, &target).await?;
            uploaded.push(record.path().to_string());
        }

        info!(
            folder = %dated,
            uploaded = uploaded.len(),
            skipped = skipped.len(),
            "Archive finished"
        );

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "folder": dated.as_str(),
                "uploaded": uploaded,
                "skipped": skipped,
            }));
        } else {
            formatter.success(&format!(
                "Archived {} file{} into {dated} ({} skipped)",
                uploaded.len(),
                if uploaded.len() == 1 { "" } else { "s" },
                skipped.len()
            ));
        }
        Ok(())
    }
}
