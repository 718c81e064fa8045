//! CLI for the FreeBox file-sharing appliance.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use freebox_core::config;
use std::path::PathBuf;

use commands::{
    run_chat, run_delete, run_download, run_list, run_stats, run_status, run_upload,
    UploadOptions,
};
use freebox_core::api::DEFAULT_ROOM;

/// Top-level CLI for FreeBox.
#[derive(Debug, Parser)]
#[command(name = "freebox")]
#[command(about = "FreeBox: upload, list and manage files on a FreeBox server", long_about = None)]
pub struct Cli {
    /// Server base URL (overrides `server_url` in config.toml).
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Upload files as one batch, several at a time.
    Upload {
        /// Local files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Store FILE under a new base name (extension is kept). Repeatable.
        #[arg(long = "rename", value_name = "FILE=BASE", value_parser = parse_assignment)]
        renames: Vec<(String, String)>,
        /// Per-file description. Repeatable.
        #[arg(long = "describe", value_name = "FILE=TEXT", value_parser = parse_assignment)]
        descriptions: Vec<(String, String)>,
        /// Description for every file without its own.
        #[arg(long, value_name = "TEXT")]
        description: Option<String>,
    },

    /// List files stored on the server.
    List {
        /// Page size (default from config, 100).
        #[arg(long, value_name = "N")]
        limit: Option<u32>,
        #[arg(long, default_value = "0", value_name = "N")]
        offset: u32,
    },

    /// Delete a stored file by its ID.
    Delete {
        /// File identifier.
        id: i64,
    },

    /// Download a stored file by its ID.
    Download {
        /// File identifier.
        id: i64,
        /// Where to write the file.
        output: PathBuf,
    },

    /// Show whether the server is online.
    Status,

    /// Show server statistics.
    Stats,

    /// Read and post chat messages.
    Chat {
        #[command(subcommand)]
        command: ChatCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ChatCommand {
    /// Post a message.
    Send {
        message: String,
        #[arg(long, default_value = DEFAULT_ROOM)]
        room: String,
        /// Shown as the sender (default: Anonymous).
        #[arg(long)]
        username: Option<String>,
    },

    /// Show recent messages, oldest first.
    Messages {
        #[arg(long, default_value = DEFAULT_ROOM)]
        room: String,
        #[arg(long, default_value = "50", value_name = "N")]
        limit: u32,
    },

    /// List chat rooms.
    Rooms,
}

/// `FILE=VALUE` pairs for `--rename` and `--describe`.
fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((file, value)) if !file.trim().is_empty() => {
            Ok((file.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FILE=VALUE, got {raw:?}")),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let server = match cli.server {
            Some(ref raw) => config::parse_server_url(raw)?,
            None => cfg.server().context("server_url in config.toml")?,
        };

        match cli.command {
            CliCommand::Upload {
                files,
                renames,
                descriptions,
                description,
            } => {
                let opts = UploadOptions {
                    files,
                    renames,
                    descriptions,
                    description,
                };
                run_upload(&cfg, &server, opts).await?
            }
            CliCommand::List { limit, offset } => {
                run_list(&server, limit.unwrap_or(cfg.list_limit), offset).await?
            }
            CliCommand::Delete { id } => run_delete(&server, id, cfg.list_limit).await?,
            CliCommand::Download { id, output } => run_download(&server, id, output).await?,
            CliCommand::Status => run_status(&server, cfg.status_timeout()).await?,
            CliCommand::Stats => run_stats(&server).await?,
            CliCommand::Chat { command } => run_chat(&server, command).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
