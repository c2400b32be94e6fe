use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use sdrchat_api::DEFAULT_API_BASE;
use sdrchat_chat::SendOrdering;
use sdrchat_storage::{clear_messages, clear_session, get_or_create_session_id};

use crate::app::{build_api, open_store};
use crate::config::{ClientConfig, DEFAULT_STORE_PATH};

/// CLI arguments for sdrchat
#[derive(Parser, Debug)]
#[command(name = "sdrchat")]
#[command(about = "SDR chat assistant - terminal client for the chat service")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the chat service API (e.g., http://localhost:8000/api)
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE, env = "SDRCHAT_API_BASE")]
    pub api_base: String,

    /// File holding the saved transcript and session id
    #[arg(long, value_name = "PATH", default_value = DEFAULT_STORE_PATH, env = "SDRCHAT_STORE")]
    pub store: PathBuf,

    /// How replies to overlapping messages are merged
    #[arg(long, value_enum, default_value_t = OrderingArg::LatestOnly, env = "SDRCHAT_ORDERING")]
    pub ordering: OrderingArg,

    /// Give up on a request after this many seconds (default: wait forever)
    #[arg(long = "timeout", value_name = "SECS", env = "SDRCHAT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Enable verbose debug output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check that the chat service is reachable
    Status,
    /// Forget the saved conversation, keeping the session
    Clear,
    /// Forget the saved conversation and the session id
    Reset,
    /// Print the session id (creating one if needed)
    Session,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingArg {
    /// Last reply to resolve overwrites the transcript
    Snapshot,
    /// Only the reply to the newest message is applied
    LatestOnly,
}

impl From<OrderingArg> for SendOrdering {
    fn from(arg: OrderingArg) -> Self {
        match arg {
            OrderingArg::Snapshot => SendOrdering::Snapshot,
            OrderingArg::LatestOnly => SendOrdering::LatestOnly,
        }
    }
}

impl Commands {
    pub async fn execute(&self, config: &ClientConfig) -> Result<String> {
        match self {
            Commands::Status => {
                let api = build_api(config)?;
                let health = api
                    .health()
                    .await
                    .with_context(|| format!("Chat service at {} is not reachable", api.base_url()))?;
                Ok(format!(
                    "{} {} ({}, v{}) at {}",
                    "✓".green(),
                    health.message,
                    health.status,
                    health.version,
                    api.base_url()
                ))
            }
            Commands::Clear => {
                let store = open_store(config)?;
                clear_messages(&*store).context("Failed to clear saved messages")?;
                Ok("🗑️  Saved conversation cleared (session kept)".to_string())
            }
            Commands::Reset => {
                let store = open_store(config)?;
                clear_session(&*store).context("Failed to clear session")?;
                Ok("🗑️  Conversation and session cleared".to_string())
            }
            Commands::Session => {
                let store = open_store(config)?;
                get_or_create_session_id(&*store).context("Failed to read session id")
            }
        }
    }
}
