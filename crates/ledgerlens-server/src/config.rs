//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default max request body size (16 MiB). This is the only size cap applied
/// to uploads.
pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Default sliding session lifetime (1 hour).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Directory uploaded invoices are written to and served from.
    pub upload_dir: PathBuf,

    /// Optional extraction prompt file, read per request.
    pub prompt_path: Option<PathBuf>,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Sliding session lifetime.
    pub session_ttl: Duration,

    /// Secret for signing the session cookie. `None` generates a random key
    /// at boot (sessions do not survive restarts anyway).
    pub cookie_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".parse().expect("valid default address"),
            upload_dir: PathBuf::from("uploads"),
            prompt_path: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            session_ttl: DEFAULT_SESSION_TTL,
            cookie_secret: None,
        }
    }
}

impl ServerConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the upload directory.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// Set the extraction prompt file.
    pub fn with_prompt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompt_path = Some(path.into());
        self
    }

    /// Set the maximum request body size.
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the sliding session lifetime.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set the cookie signing secret.
    pub fn with_cookie_secret(mut self, secret: impl Into<String>) -> Self {
        self.cookie_secret = Some(secret.into());
        self
    }
}
