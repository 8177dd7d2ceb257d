//! Chat configuration: webhook endpoint, timeouts, limits, storage and log paths. Loaded from env.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:5678/webhook/chat-bienvenida";

/// Client-side throttling of outgoing sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Accepted sends per window.
    pub max_per_window: u32,
    pub window: Duration,
    /// Minimum gap between two accepted sends.
    pub min_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: 10,
            window: Duration::from_secs(60),
            min_interval: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// CHAT_API_ENDPOINT
    pub api_endpoint: String,
    /// CHAT_TIMEOUT_MS; per-request abort.
    pub timeout: Duration,
    /// CHAT_MAX_RETRIES; only transport failures are retried.
    pub max_retries: u32,
    /// CHAT_MAX_MESSAGES; transcript entries kept in storage.
    pub max_messages: usize,
    /// CHAT_SESSION_TIMEOUT_SECS; idle time after which a stored session expires.
    pub session_timeout: Duration,
    pub rate_limit: RateLimitConfig,
    /// CHAT_STORAGE_PATH
    pub storage_path: PathBuf,
    /// CONTENT_DIR; root of the markdown service descriptions.
    pub content_dir: PathBuf,
    /// LOG_FILE
    pub log_file: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            timeout: Duration::from_millis(10_000),
            max_retries: 3,
            max_messages: 50,
            session_timeout: Duration::from_secs(24 * 60 * 60),
            rate_limit: RateLimitConfig::default(),
            storage_path: PathBuf::from("./data/chat_storage.json"),
            content_dir: PathBuf::from("./content"),
            log_file: "logs/tusolucion-chat.log".to_string(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{} is not a valid value: {}", name, raw)),
        _ => Ok(None),
    }
}

impl ChatConfig {
    /// Load from environment variables; unset variables keep their defaults.
    /// Call `dotenvy::dotenv()` first so `.env` values are visible.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_endpoint = env::var("CHAT_API_ENDPOINT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.api_endpoint);
        let timeout = parse_var::<u64>("CHAT_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);
        let max_retries = parse_var("CHAT_MAX_RETRIES")?.unwrap_or(defaults.max_retries);
        let max_messages = parse_var("CHAT_MAX_MESSAGES")?.unwrap_or(defaults.max_messages);
        let session_timeout = parse_var::<u64>("CHAT_SESSION_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_timeout);
        let rate_limit = RateLimitConfig {
            max_per_window: parse_var("CHAT_RATE_LIMIT_PER_MINUTE")?
                .unwrap_or(defaults.rate_limit.max_per_window),
            window: defaults.rate_limit.window,
            min_interval: parse_var::<u64>("CHAT_MIN_MESSAGE_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.rate_limit.min_interval),
        };
        let storage_path = env::var("CHAT_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);
        let content_dir = env::var("CONTENT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.content_dir);
        let log_file = env::var("LOG_FILE").unwrap_or(defaults.log_file);

        Ok(Self {
            api_endpoint,
            timeout,
            max_retries,
            max_messages,
            session_timeout,
            rate_limit,
            storage_path,
            content_dir,
            log_file,
        })
    }

    /// Validate config (endpoint must be an http(s) URL, timeout non-zero).
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_endpoint).with_context(|| {
            format!(
                "CHAT_API_ENDPOINT is not a valid URL: {}",
                self.api_endpoint
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "CHAT_API_ENDPOINT must use http or https: {}",
                self.api_endpoint
            );
        }
        if self.timeout.is_zero() {
            anyhow::bail!("CHAT_TIMEOUT_MS must be greater than zero");
        }
        Ok(())
    }
}
