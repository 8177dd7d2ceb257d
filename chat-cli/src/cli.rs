//! CLI parser and config loading.

use anyhow::{Context, Result};
use chat_core::ChatConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tusolucion-chat")]
#[command(about = "TuSolución chat assistant in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Also print log lines to stdout (they always go to LOG_FILE).
    #[arg(long, global = true)]
    pub log_stdout: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive session; plain lines are sent, /help lists commands.
    Chat,
    /// Send one message and print the reply.
    Send {
        /// Message text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print what is stored locally (session, message count, preferences).
    Info,
    /// Wipe the stored session and transcript.
    Clear,
    /// Print a service description from CONTENT_DIR/services/<slug>.md.
    Content { slug: String },
}

/// Loads ChatConfig from the environment and validates it.
pub fn load_config() -> Result<ChatConfig> {
    let config = ChatConfig::from_env().context("Load chat config from environment")?;
    config.validate().context("Validate chat config")?;
    Ok(config)
}
