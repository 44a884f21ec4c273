//! Session store with sliding TTL expiry.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Default session lifetime (1 hour, refreshed on every access).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Identifier for a browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The invoice state held for one session: the last extraction result and
/// the saved upload it came from.
#[derive(Debug, Clone)]
pub struct InvoiceRecord {
    /// The extraction result as a JSON value (arbitrary, model-dependent
    /// shape; may be a failure-wrapped fallback).
    pub data: serde_json::Value,

    /// Base name of the saved upload, used for `/uploads/{name}` URLs.
    pub file_name: String,

    /// Full path of the saved upload on disk.
    pub file_path: PathBuf,
}

#[derive(Debug)]
struct Entry {
    invoice: Option<InvoiceRecord>,
    last_access: Instant,
}

impl Entry {
    fn new() -> Self {
        Self {
            invoice: None,
            last_access: Instant::now(),
        }
    }

    fn expired(&self, ttl: Duration) -> bool {
        self.last_access.elapsed() > ttl
    }
}

/// In-memory session store keyed by [`SessionId`].
///
/// Every access refreshes the entry's TTL timer (sliding lifetime). Expired
/// entries are treated as absent and removed lazily on access;
/// [`purge_expired`](SessionStore::purge_expired) sweeps the rest.
#[derive(Debug)]
pub struct SessionStore {
    entries: RwLock<HashMap<SessionId, Entry>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store with the given sliding TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get or create a session.
    ///
    /// A known, unexpired `id` is touched and returned. An unknown or
    /// expired `id` gets a fresh entry under the same id, so a browser
    /// keeps its cookie across server restarts. `None` creates a new
    /// session with a new id.
    pub async fn get_or_create(&self, id: Option<SessionId>) -> SessionId {
        let mut entries = self.entries.write().await;

        match id {
            Some(id) => {
                match entries.get_mut(&id) {
                    Some(entry) if !entry.expired(self.ttl) => {
                        entry.last_access = Instant::now();
                    }
                    _ => {
                        debug!(session_id = %id, "Creating session for presented id");
                        entries.insert(id, Entry::new());
                    }
                }
                id
            }
            None => {
                let id = SessionId::new();
                debug!(session_id = %id, "Creating new session");
                entries.insert(id, Entry::new());
                id
            }
        }
    }

    /// Store the invoice record for a session, creating the session if
    /// needed. Replaces any previous record.
    pub async fn store_invoice(&self, id: SessionId, record: InvoiceRecord) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(id).or_insert_with(Entry::new);
        entry.invoice = Some(record);
        entry.last_access = Instant::now();
    }

    /// Fetch the invoice record for a session, refreshing its TTL.
    ///
    /// Returns `None` for unknown or expired sessions; expired entries are
    /// removed on the spot.
    pub async fn invoice(&self, id: SessionId) -> Option<InvoiceRecord> {
        let mut entries = self.entries.write().await;

        match entries.get_mut(&id) {
            Some(entry) if entry.expired(self.ttl) => {
                debug!(session_id = %id, "Session expired");
                entries.remove(&id);
                None
            }
            Some(entry) => {
                entry.last_access = Instant::now();
                entry.invoice.clone()
            }
            None => None,
        }
    }

    /// Whether the session holds an invoice record.
    pub async fn has_invoice(&self, id: SessionId) -> bool {
        self.invoice(id).await.is_some()
    }

    /// Remove a session entirely. Returns `true` if it existed.
    pub async fn clear(&self, id: SessionId) -> bool {
        let removed = self.entries.write().await.remove(&id).is_some();
        if removed {
            debug!(session_id = %id, "Session cleared");
        }
        removed
    }

    /// Remove all expired sessions, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.expired(self.ttl));
        before - entries.len()
    }

    /// Number of live (possibly expired but unswept) sessions.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}
