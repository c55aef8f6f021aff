//! CLI argument parsing and subcommand handlers.

use crate::config::{self, CONFIG_FILE};
use anyhow::Result;
use clap::{Parser, Subcommand};
use gate::{Clock, SystemClock};
use std::path::PathBuf;
use tokio::signal;

/// Folio portfolio dashboard.
#[derive(Parser, Debug)]
#[command(name = "folio-dashboard", about = "Folio portfolio dashboard", version)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Config file path (default: `<config dir>/folio/folio.toml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the dashboard until ctrl-c.
    Serve {
        /// Bind address override, e.g. `0.0.0.0:8080`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Write a default config file.
    Init,
    /// Decode an access token and print its identity.
    InspectToken {
        /// Access token (JWT).
        token: String,
    },
}

impl Cli {
    /// Run the selected subcommand.
    pub async fn run(self) -> Result<()> {
        match &self.command {
            Command::Serve { bind } => {
                let path = self.config_path()?;
                let handle = crate::serve(&path, bind.as_deref()).await?;
                shutdown_signal().await;
                handle.shutdown().await?;
                tracing::info!("dashboard shut down");
            }
            Command::Init => {
                let path = self.config_path()?;
                config::scaffold(&path)?;
                println!("{}", path.display());
            }
            Command::InspectToken { token } => inspect_token(token)?,
        }
        Ok(())
    }

    /// The `--config` path, or `folio.toml` in the global config directory.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(config::global_config_dir()?.join(CONFIG_FILE)),
        }
    }
}

fn inspect_token(token: &str) -> Result<()> {
    let identity = gate::decode(token)?;
    let expired = identity.is_expired_at(SystemClock.now());
    println!("subject:  {}", identity.subject_id);
    println!("email:    {}", identity.email);
    if let Some(issued_at) = identity.issued_at {
        println!("issued:   {}", issued_at.to_rfc3339());
    }
    println!("expires:  {}", identity.expires_at.to_rfc3339());
    println!("expired:  {expired}");
    Ok(())
}

/// Wait for ctrl-c. If the handler cannot be installed, return at once.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
    }
}
