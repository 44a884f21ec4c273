//! In-memory session state for LedgerLens.
//!
//! Sessions are keyed by a [`SessionId`] carried in a signed browser cookie;
//! the server side holds the last extraction result per session with a
//! sliding TTL. The chat-context provider reads the same per-session store,
//! so concurrent users never observe each other's invoice context.
//!
//! Nothing here is durable: a restart drops all sessions, by design.

pub mod context;
pub mod store;

pub use context::{ContextProvider, NO_INVOICE_CONTEXT};
pub use store::{InvoiceRecord, SessionId, SessionStore};
