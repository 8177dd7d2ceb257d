//! Transcript rendering and REPL command parsing.

use chat_core::{Message, Sender};

/// A line typed at the `chat` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    Open,
    Close,
    Minimize,
    Read,
    Retry,
    Clear,
    Info,
    Help,
    Quit,
    Unknown(String),
    Blank,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::Blank;
        }
        if !line.starts_with('/') {
            return ReplCommand::Send(line.to_string());
        }
        match line {
            "/open" => ReplCommand::Open,
            "/close" => ReplCommand::Close,
            "/minimize" => ReplCommand::Minimize,
            "/read" => ReplCommand::Read,
            "/retry" => ReplCommand::Retry,
            "/clear" => ReplCommand::Clear,
            "/info" => ReplCommand::Info,
            "/help" => ReplCommand::Help,
            "/quit" | "/exit" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        }
    }
}

pub const HELP: &str = "\
/open      abrir el chat
/close     cerrar el chat
/minimize  minimizar (se recuerda al reiniciar)
/read      marcar como leído
/retry     reintentar el último mensaje
/clear     borrar la conversación
/info      estado del almacenamiento local
/quit      salir";

/// One transcript line: `[HH:MM] Tú: ...`, `[HH:MM] Asistente: ...`, errors marked with `!`.
pub fn render_message(message: &Message) -> String {
    let time = message.timestamp.format("%H:%M");
    let who = match message.sender {
        Sender::User => "Tú",
        Sender::Bot => "Asistente",
    };
    let marker = if message.is_error { "! " } else { "" };
    format!("[{}] {}{}: {}", time, marker, who, message.text)
}

/// Tracks how much of the transcript has been printed.
#[derive(Debug, Default)]
pub struct TranscriptCursor {
    printed: usize,
}

impl TranscriptCursor {
    /// Messages not printed yet. A transcript shorter than what was printed (cleared, or error
    /// bubbles dropped by a retry) restarts from the top.
    pub fn unseen<'a>(&mut self, messages: &'a [Message]) -> &'a [Message] {
        if messages.len() < self.printed {
            self.printed = 0;
        }
        let start = self.printed;
        self.printed = messages.len();
        &messages[start..]
    }
}
