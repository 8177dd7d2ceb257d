//! Tracing initialization: fmt layer with level, target and all fields, written to the log file and
//! optionally tee'd to stdout.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan, fmt::writer::MakeWriterExt, layer::SubscriberExt,
    util::SubscriberInitExt, EnvFilter, Registry,
};

/// Installs the global tracing subscriber.
///
/// Level comes from `RUST_LOG` (default `info`); load `.env` before calling so it takes effect.
/// The interactive front end passes `to_stdout = false` so log lines do not interleave with the
/// transcript.
pub fn init_tracing(log_file_path: &str, to_stdout: bool) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    let file = Arc::new(file);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = Registry::default().with(env_filter);

    let result = if to_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stdout.and(file))
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_level(true)
            .with_file(false)
            .with_line_number(false);
        registry.with(fmt_layer).try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_level(true)
            .with_file(false)
            .with_line_number(false);
        registry.with(fmt_layer).try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))
}
