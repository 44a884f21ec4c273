//! Per-session chat context.
//!
//! The context handed to the model for follow-up questions is the string
//! form of the session's last extraction result. Context is keyed by
//! session id, never shared across sessions.

use std::sync::Arc;

use tracing::debug;

use crate::store::{InvoiceRecord, SessionId, SessionStore};

/// Sentinel returned when a session has no stored extraction.
pub const NO_INVOICE_CONTEXT: &str = "No invoice data available";

/// Builds chat context from the per-session invoice store.
#[derive(Debug, Clone)]
pub struct ContextProvider {
    store: Arc<SessionStore>,
}

impl ContextProvider {
    /// Create a provider over the given store.
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Replace the session's stored extraction result.
    pub async fn update(&self, id: SessionId, record: InvoiceRecord) {
        debug!(
            session_id = %id,
            file = %record.file_name,
            "Updating chat context"
        );
        self.store.store_invoice(id, record).await;
    }

    /// The chat context for a session.
    ///
    /// The question is accepted for logging only; the context is always the
    /// full stored result, pretty-printed, or [`NO_INVOICE_CONTEXT`] when
    /// nothing has been stored yet.
    pub async fn context_for(&self, id: SessionId, question: &str) -> String {
        debug!(
            session_id = %id,
            question_len = question.len(),
            "Building chat context"
        );

        match self.store.invoice(id).await {
            Some(record) => pretty_json(&record.data),
            None => NO_INVOICE_CONTEXT.to_string(),
        }
    }
}

fn pretty_json(value: &serde_json::Value) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(s) => s,
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_SESSION_TTL;
    use serde_json::json;
    use std::path::PathBuf;

    fn provider() -> (ContextProvider, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new(DEFAULT_SESSION_TTL));
        (ContextProvider::new(store.clone()), store)
    }

    fn record() -> InvoiceRecord {
        InvoiceRecord {
            data: json!({"vendor": "Acme Corporation", "total_amount": 2712.50}),
            file_name: "inv.png".to_string(),
            file_path: PathBuf::from("/tmp/inv.png"),
        }
    }

    #[tokio::test]
    async fn test_context_without_invoice_is_sentinel() {
        let (provider, store) = provider();
        let id = store.get_or_create(None).await;

        let context = provider.context_for(id, "What is the total?").await;
        assert_eq!(context, NO_INVOICE_CONTEXT);
    }

    #[tokio::test]
    async fn test_context_is_pretty_printed_result() {
        let (provider, store) = provider();
        let id = store.get_or_create(None).await;
        provider.update(id, record()).await;

        let context = provider.context_for(id, "anything").await;
        assert!(context.contains("Acme Corporation"));

        let parsed: serde_json::Value = serde_json::from_str(&context).unwrap();
        assert_eq!(parsed["total_amount"], json!(2712.50));
    }

    #[tokio::test]
    async fn test_context_ignores_question_content() {
        let (provider, store) = provider();
        let id = store.get_or_create(None).await;
        provider.update(id, record()).await;

        let a = provider.context_for(id, "What is the total?").await;
        let b = provider.context_for(id, "completely different question").await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_context_is_per_session() {
        let (provider, store) = provider();
        let a = store.get_or_create(None).await;
        let b = store.get_or_create(None).await;
        provider.update(a, record()).await;

        assert!(provider.context_for(a, "q").await.contains("Acme"));
        assert_eq!(provider.context_for(b, "q").await, NO_INVOICE_CONTEXT);
    }
}
