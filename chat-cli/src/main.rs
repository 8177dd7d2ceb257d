//! tusolucion-chat: the chat widget in a terminal. Config from env (`.env` is loaded first).

use std::sync::Arc;

use anyhow::{Context, Result};
use chat_cli::render::HELP;
use chat_cli::{
    load_config, render_message, Cli, Commands, ReplCommand, ServiceContentStore,
    TranscriptCursor,
};
use chat_client::ChatApiClient;
use chat_core::{init_tracing, ChatConfig};
use chat_runtime::ChatController;
use chat_storage::{initialize_storage_lifecycle, ChatStorage, FileStorage};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config()?;
    init_tracing(&config.log_file, cli.log_stdout).context("Initialize tracing")?;
    info!(
        endpoint = %config.api_endpoint,
        storage = %config.storage_path.display(),
        "Starting tusolucion-chat"
    );

    match cli.command {
        Commands::Chat => run_chat(&config).await,
        Commands::Send { text } => handle_send(&config, &text.join(" ")).await,
        Commands::Info => handle_info(&config),
        Commands::Clear => handle_clear(&config),
        Commands::Content { slug } => handle_content(&config, &slug),
    }
}

fn open_storage(config: &ChatConfig) -> ChatStorage {
    ChatStorage::new(Arc::new(FileStorage::new(&config.storage_path)))
        .with_max_messages(config.max_messages)
        .with_session_timeout(config.session_timeout)
}

fn build_controller(config: &ChatConfig, storage: ChatStorage) -> ChatController {
    let bot = Arc::new(ChatApiClient::from_config(config));
    ChatController::new(storage, bot, config.rate_limit)
}

fn print_info(storage: &ChatStorage) -> Result<()> {
    let info = serde_json::to_string_pretty(&storage.storage_info())
        .context("Serialize storage info")?;
    println!("{}", info);
    Ok(())
}

async fn run_chat(config: &ChatConfig) -> Result<()> {
    let storage = open_storage(config);
    let controller = build_controller(config, storage.clone());
    let lifecycle = initialize_storage_lifecycle(storage.clone(), || {
        debug!("chat visible again, storage swept");
    });

    // Typing indicator, driven by state changes.
    let mut updates = controller.subscribe();
    let indicator = tokio::spawn(async move {
        let mut typing = false;
        while updates.changed().await.is_ok() {
            let now_typing = updates.borrow_and_update().is_typing;
            if now_typing && !typing {
                println!("  Asistente está escribiendo...");
            }
            typing = now_typing;
        }
    });

    let mut cursor = TranscriptCursor::default();
    let mut shown_error: Option<String> = None;
    if controller.restore_visibility() {
        println!("Chat de TuSolución. Escribe tu mensaje o /help.");
        print_unseen(&controller, &mut cursor);
    } else {
        println!("Chat minimizado. Usa /open para abrirlo.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Read from stdin")? {
        lifecycle.notify_visible();

        match ReplCommand::parse(&line) {
            ReplCommand::Blank => continue,
            ReplCommand::Send(text) => controller.send_message(&text).await,
            ReplCommand::Open => {
                controller.open_chat();
                cursor = TranscriptCursor::default();
            }
            ReplCommand::Close => {
                controller.close_chat();
                println!("Chat cerrado.");
            }
            ReplCommand::Minimize => {
                controller.minimize_chat();
                println!("Chat minimizado.");
            }
            ReplCommand::Read => controller.mark_as_read(),
            ReplCommand::Retry => controller.retry_last_message().await,
            ReplCommand::Clear => {
                controller.clear_messages();
                println!("Conversación borrada.");
            }
            ReplCommand::Info => print_info(&storage)?,
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(cmd) => println!("Comando desconocido: {} (usa /help)", cmd),
        }

        let state = controller.state();
        if state.is_open {
            print_unseen(&controller, &mut cursor);
        } else if state.has_unread_messages {
            println!("  (mensajes nuevos, usa /open)");
        }
        // Error bubbles are already in the transcript; only banner-style errors print here.
        let bubble = state.messages.last().is_some_and(|m| m.is_error);
        if state.error != shown_error {
            if let (Some(error), false) = (&state.error, bubble) {
                println!("  {}", error);
            }
            shown_error = state.error;
        }
    }

    indicator.abort();
    lifecycle.dispose();
    info!(session_id = %controller.session_id(), "Chat session ended");
    Ok(())
}

fn print_unseen(controller: &ChatController, cursor: &mut TranscriptCursor) {
    let state = controller.state();
    for message in cursor.unseen(&state.messages) {
        println!("{}", render_message(message));
    }
}

async fn handle_send(config: &ChatConfig, text: &str) -> Result<()> {
    let controller = build_controller(config, open_storage(config));
    let before = controller.state().messages.len();
    controller.send_message(text).await;

    let state = controller.state();
    // User message plus reply (or error bubble).
    if state.messages.len() >= before + 2 {
        if let Some(reply) = state.messages.last() {
            println!("{}", reply.text);
        }
        return Ok(());
    }
    match state.error {
        Some(error) => anyhow::bail!(error),
        None => Ok(()),
    }
}

fn handle_info(config: &ChatConfig) -> Result<()> {
    print_info(&open_storage(config))
}

fn handle_clear(config: &ChatConfig) -> Result<()> {
    let storage = open_storage(config);
    if storage.clear_session() {
        println!("Sesión borrada ({}).", config.storage_path.display());
        Ok(())
    } else {
        anyhow::bail!("Could not clear chat storage at {}", config.storage_path.display())
    }
}

fn handle_content(config: &ChatConfig, slug: &str) -> Result<()> {
    let store = ServiceContentStore::new(&config.content_dir);
    match store.load(slug) {
        Ok(content) => {
            print!("{}", content);
            Ok(())
        }
        Err(e) => anyhow::bail!("{} {}", e.status_code(), e),
    }
}
