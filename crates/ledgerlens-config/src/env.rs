//! Application configuration from environment variables.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set to an unparseable value.
    #[error("invalid value for {var}: {message}")]
    Invalid {
        /// The environment variable.
        var: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Application configuration.
///
/// Every field has a default, so a bare environment starts a working server
/// (mock model client, localhost bind, `uploads/` directory).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Directory uploaded invoices are written to.
    pub upload_dir: PathBuf,

    /// Optional extraction prompt file; the built-in prompt is used when
    /// unset or unreadable.
    pub prompt_path: Option<PathBuf>,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Session lifetime in seconds (sliding).
    pub session_ttl_secs: u64,

    /// Secret for signing the session cookie; a random key is generated at
    /// boot when unset.
    pub session_secret: Option<String>,

    /// Model provider flag: `live`, `mock`, or `auto`.
    pub model_provider: String,

    /// Anthropic API key, when configured.
    pub anthropic_api_key: Option<String>,

    /// Model identifier override.
    pub model: Option<String>,

    /// Artificial delay for the mock client, in milliseconds.
    pub mock_delay_ms: u64,

    /// Default log filter level.
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file first if one is present, then reads each
    /// variable, applying defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: get_var_or("LEDGERLENS_HOST", "127.0.0.1"),
            port: parse_var("LEDGERLENS_PORT", 8000)?,
            upload_dir: PathBuf::from(get_var_or("LEDGERLENS_UPLOAD_DIR", "uploads")),
            prompt_path: env::var("LEDGERLENS_PROMPT").ok().map(PathBuf::from),
            max_body_size: parse_var("LEDGERLENS_MAX_BODY_SIZE", 16 * 1024 * 1024)?,
            session_ttl_secs: parse_var("LEDGERLENS_SESSION_TTL_SECS", 3600)?,
            session_secret: env::var("LEDGERLENS_SESSION_SECRET").ok(),
            model_provider: get_var_or("MODEL_PROVIDER", "auto"),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok(),
            model: env::var("LEDGERLENS_MODEL").ok(),
            mock_delay_ms: parse_var("MOCK_DELAY_MS", 2000)?,
            log_level: get_var_or("LOG_LEVEL", "info"),
        })
    }

    /// The bind address as a `host:port` string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_var<T>(key: &'static str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: key,
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
