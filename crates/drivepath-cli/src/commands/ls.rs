//! Ls command - List one remote directory
//!
//! Resolves the path (listing ancestors as needed), re-lists it and prints
//! its children sorted by name.

use anyhow::Result;
use clap::Args;
use tracing::info;

use drivepath_core::domain::Record;

use super::context::{parse_remote, require_existing, CliContext};

/// Arguments for `drivepath ls`
#[derive(Debug, Args)]
pub struct LsCommand {
    /// Remote directory to list
    #[arg(default_value = "/")]
    pub path: String,

    /// Show modification times
    #[arg(short, long)]
    pub long: bool,
}

impl LsCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let path = parse_remote(&self.path)?;
        let mut fs = ctx.open_filesystem().await?;

        require_existing(&mut fs, &path).await?;
        let mut children = fs.ls(&path).await?;
        children.sort_by(|a, b| a.name().cmp(b.name()));

        info!(path = %path, count = children.len(), "Listed directory");

        let formatter = ctx.formatter();
        if ctx.is_json() {
            let records: Vec<&Record> = children.iter().map(|c| c.as_ref()).collect();
            formatter.print_json(&serde_json::to_value(records)?);
        } else {
            for child in &children {
                formatter.record(child, self.long);
            }
        }
        Ok(())
    }
}
