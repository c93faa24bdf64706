//! Mkdir, mv and rm commands - Remote mutations
//!
//! Each command resolves what it needs through the cache, applies one remote
//! call and reports the resulting record.

use anyhow::Result;
use clap::Args;
use tracing::info;

use drivepath_core::domain::Record;

use super::context::{parse_remote, require_existing, CliContext};

fn report(ctx: &CliContext, verb: &str, record: &Record) -> Result<()> {
    let formatter = ctx.formatter();
    if ctx.is_json() {
        formatter.print_json(&serde_json::json!({
            "success": true,
            "action": verb,
            "record": record,
        }));
    } else {
        formatter.success(&format!("{verb} {}", record.path()));
    }
    Ok(())
}

/// Arguments for `drivepath mkdir`
#[derive(Debug, Args)]
pub struct MkdirCommand {
    /// Remote path of the new directory
    pub path: String,
}

impl MkdirCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let path = parse_remote(&self.path)?;
        let mut fs = ctx.open_filesystem().await?;

        let record = fs.mkdir(&path).await?;
        info!(path = %record.path(), id = %record.id(), "mkdir done");
        report(ctx, "Created", &record)
    }
}

/// Arguments for `drivepath mv`
#[derive(Debug, Args)]
pub struct MvCommand {
    /// Remote entry to move
    pub path: String,
    /// Destination folder
    pub folder: String,
}

impl MvCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let path = parse_remote(&self.path)?;
        let folder = parse_remote(&self.folder)?;
        let mut fs = ctx.open_filesystem().await?;

        // mv works on cached entries only
        fs.ls(&path.dirname()).await?;
        fs.ls(&folder.dirname()).await?;
        require_existing(&mut fs, &path).await?;
        require_existing(&mut fs, &folder).await?;

        let record = fs.mv(&path, &folder).await?;
        report(ctx, "Moved to", &record)
    }
}

/// Arguments for `drivepath rm`
#[derive(Debug, Args)]
pub struct RmCommand {
    /// Remote entry to trash
    pub path: String,
}

impl RmCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let path = parse_remote(&self.path)?;
        let mut fs = ctx.open_filesystem().await?;

        let record = fs.rm(&path).await?;
        report(ctx, "Trashed", &record)
    }
}
