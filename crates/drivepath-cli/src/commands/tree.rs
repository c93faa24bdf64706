//! Tree command - Index the whole drive and print every cached path

use anyhow::Result;
use clap::Args;

use super::context::CliContext;

/// Arguments for `drivepath tree`
#[derive(Debug, Args)]
pub struct TreeCommand {
    /// Show modification times
    #[arg(short, long)]
    pub long: bool,
}

impl TreeCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let mut fs = ctx.open_filesystem().await?;
        fs.ls_all().await?;

        let index = fs.index();
        let formatter = ctx.formatter();
        if ctx.is_json() {
            let paths: Vec<String> = index.paths().iter().map(|p| p.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "count": paths.len(),
                "paths": paths,
            }));
            return Ok(());
        }

        for path in index.paths() {
            if let Ok(record) = index.get_by_path(&path) {
                formatter.record(&record, self.long);
            }
        }
        Ok(())
    }
}
