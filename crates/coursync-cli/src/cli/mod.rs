//! CLI for coursync.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use coursync_core::config::{self, SyncConfig};
use std::path::{Path, PathBuf};

use commands::{run_check, run_sync};

/// Top-level CLI for coursync.
#[derive(Debug, Parser)]
#[command(name = "coursync")]
#[command(about = "coursync: download course archives behind SSO and file them by rules", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, or JSON when it ends in `.json`).
    /// Defaults to ~/.config/coursync/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Log in, download every course archive, then apply the filing rules.
    Sync {
        /// Skip login and downloads; only apply the rules to what is on disk.
        #[arg(long)]
        skip_fetch: bool,
    },

    /// Apply the filing rules to what is already on disk (same as `sync --skip-fetch`).
    Classify,

    /// Load and validate the configuration, then print a summary.
    Check,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sync { skip_fetch } => run_sync(&cfg, skip_fetch).await?,
            CliCommand::Classify => run_sync(&cfg, true).await?,
            CliCommand::Check => run_check(&cfg)?,
        }

        Ok(())
    }
}

fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    let cfg = match path {
        Some(p) => config::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    Ok(cfg)
}
