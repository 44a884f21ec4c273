//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use tracing::{info, warn};

use ledgerlens_model::SharedModelClient;
use ledgerlens_session::{ContextProvider, SessionId, SessionStore};

use crate::config::ServerConfig;

/// Name of the signed session cookie.
pub const SESSION_COOKIE: &str = "ledgerlens_session";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The model client (live or mock).
    pub client: SharedModelClient,

    /// Per-session invoice store.
    pub sessions: Arc<SessionStore>,

    /// Per-session chat context provider.
    pub context: ContextProvider,

    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Signing key for the session cookie.
    cookie_key: Key,
}

impl AppState {
    /// Create application state from a model client and configuration.
    pub fn new(client: SharedModelClient, config: ServerConfig) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session_ttl));
        let context = ContextProvider::new(Arc::clone(&sessions));
        let cookie_key = cookie_key(config.cookie_secret.as_deref());

        Self {
            client,
            sessions,
            context,
            config: Arc::new(config),
            cookie_key,
        }
    }

    /// Resolve the session for a request and re-issue its cookie.
    ///
    /// The presented cookie value is used when it parses; unknown or expired
    /// ids get a fresh server-side entry. The returned jar carries the
    /// refreshed cookie, giving the session its sliding lifetime.
    pub async fn establish_session(&self, jar: SignedCookieJar) -> (SessionId, SignedCookieJar) {
        let presented = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse::<SessionId>().ok());

        let id = self.sessions.get_or_create(presented).await;
        let jar = jar.add(self.session_cookie(id));
        (id, jar)
    }

    /// The session id presented by the request cookie, if any. Does not
    /// create a session.
    pub fn presented_session(&self, jar: &SignedCookieJar) -> Option<SessionId> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse::<SessionId>().ok())
    }

    /// Build the session cookie for `id`.
    pub fn session_cookie(&self, id: SessionId) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(
                self.config.session_ttl.as_secs() as i64
            ))
            .build()
    }

    /// A removal cookie matching the session cookie's path.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, "")).path("/").build()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}

/// Derive the cookie signing key from the configured secret, or generate a
/// random key when none is set.
///
/// Secrets shorter than the 64 bytes `Key::derive_from` requires are
/// cycle-extended first, so short development secrets still work.
fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) if !secret.is_empty() => {
            let bytes = secret.as_bytes();
            if bytes.len() >= 64 {
                Key::derive_from(bytes)
            } else {
                warn!(
                    len = bytes.len(),
                    "Session secret shorter than 64 bytes, stretching it"
                );
                let mut buf = [0u8; 64];
                for (slot, byte) in buf.iter_mut().zip(bytes.iter().cycle()) {
                    *slot = *byte;
                }
                Key::derive_from(&buf)
            }
        }
        _ => {
            info!("No session secret configured, generating a random signing key");
            Key::generate()
        }
    }
}
