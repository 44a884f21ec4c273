//! HTTP API server for LedgerLens.
//!
//! Binds the upload, chat, status, and session-clear actions to the model
//! client and the per-session store. Sessions ride a signed cookie with a
//! sliding one-hour lifetime; saved invoice images are served back from the
//! upload directory.
//!
//! # Example
//!
//! ```ignore
//! use ledgerlens_model::{ModelClientConfig, build_client};
//! use ledgerlens_server::{Server, ServerConfig};
//!
//! let client = build_client(ModelClientConfig::from_env()?)?;
//! let config = ServerConfig::new().with_bind_address("127.0.0.1:8000".parse()?);
//!
//! Server::new(client, config).run().await?;
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod uploads;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use routes::{ChatMessageRequest, ChatMessageResponse, UploadResponse};
pub use state::{AppState, SESSION_COOKIE};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use ledgerlens_model::SharedModelClient;

/// The LedgerLens HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server from a model client and configuration.
    pub fn new(client: SharedModelClient, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(client, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        // The browser-facing JSON endpoints carry permissive CORS headers,
        // preflight included.
        let cors_routes = Router::new()
            .route("/upload", post(routes::upload_handler))
            .route("/chat/message", post(routes::chat_message_handler))
            .layer(CorsLayer::permissive());

        Router::new()
            .route("/", get(routes::index_page))
            .route("/chat", get(routes::chat_page))
            .merge(cors_routes)
            .route("/clear_session", post(routes::clear_session_handler))
            .route("/status", get(routes::status_handler))
            .nest_service(
                "/uploads",
                ServeDir::new(&self.state.config.upload_dir),
            )
            .layer(DefaultBodyLimit::max(self.state.config.max_body_size))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until shutdown.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        let router = self.router();

        info!(%addr, "Starting server");

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// The configured bind address.
    pub fn bind_address(&self) -> std::net::SocketAddr {
        self.state.config.bind_address
    }
}
