//! drivepath CLI - Path-addressed access to a Google Drive
//!
//! Provides commands for:
//! - Listing directories and the whole cached tree
//! - Copying files to and from the drive
//! - Creating, moving and trashing remote entries
//! - Pulling remote folders and archiving local ones

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drivepath_core::config::Config;

mod commands;
mod output;

use commands::{
    archive::ArchiveCommand,
    completions::CompletionsCommand,
    config::ConfigCommand,
    context::CliContext,
    ls::LsCommand,
    mutate::{MkdirCommand, MvCommand, RmCommand},
    pull::PullCommand,
    scp::ScpCommand,
    tree::TreeCommand,
};
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "drivepath", version, about = "Path-addressed Google Drive client")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// OAuth client credentials file (overrides auth.credentials_file)
    #[arg(long, global = true)]
    creds: Option<PathBuf>,

    /// Token file (overrides auth.token_file)
    #[arg(long, global = true)]
    token: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List a remote directory
    Ls(LsCommand),
    /// Copy a file between the drive and the local filesystem
    Scp(ScpCommand),
    /// Create a remote directory
    Mkdir(MkdirCommand),
    /// Move a remote entry into another folder
    Mv(MvCommand),
    /// Move a remote entry to the trash
    Rm(RmCommand),
    /// Index the whole drive and print every path
    Tree(TreeCommand),
    /// Download the files of a remote directory
    Pull(PullCommand),
    /// Upload a local directory into a dated remote folder
    Archive(ArchiveCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Picks the log filter: `-v` flags win over the configured level
fn log_filter(verbose: u8, config_path: &std::path::Path) -> String {
    match verbose {
        0 => Config::load_or_default(config_path).logging.level,
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let filter = log_filter(cli.verbose, &config_path);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CliContext::new(format, cli.config, cli.creds, cli.token);

    let result = match cli.command {
        Commands::Ls(cmd) => cmd.execute(&ctx).await,
        Commands::Scp(cmd) => cmd.execute(&ctx).await,
        Commands::Mkdir(cmd) => cmd.execute(&ctx).await,
        Commands::Mv(cmd) => cmd.execute(&ctx).await,
        Commands::Rm(cmd) => cmd.execute(&ctx).await,
        Commands::Tree(cmd) => cmd.execute(&ctx).await,
        Commands::Pull(cmd) => cmd.execute(&ctx).await,
        Commands::Archive(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
        Commands::Completions(cmd) => cmd.execute(&ctx).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            get_formatter(cli.json).error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
