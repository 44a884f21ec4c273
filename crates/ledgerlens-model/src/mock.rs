//! Mock model client.
//!
//! Returns a fixed canned invoice after an artificial delay and answers chat
//! questions by keyword matching. Selected when no credentials are
//! configured, so the application remains fully exercisable offline.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::client::ModelClient;
use crate::types::ExtractionResult;

/// Default artificial processing delay, approximating a real model call.
const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Attribution recorded in extraction results produced by this client.
const ATTRIBUTION: &str = "Mock invoice client";

/// Mock client returning canned data without any network dependency.
#[derive(Debug, Clone)]
pub struct MockClient {
    delay: Duration,
}

impl MockClient {
    /// Create a mock client with the default delay.
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }

    /// Create a mock client with a custom delay. Tests use `Duration::ZERO`.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelClient for MockClient {
    async fn extract(&self, image_path: &Path, _prompt: &str) -> ExtractionResult {
        info!(path = %image_path.display(), "Mock extraction");
        tokio::time::sleep(self.delay).await;

        ExtractionResult::from_model_text(&canned_invoice().to_string(), ATTRIBUTION)
    }

    async fn chat(&self, question: &str, _context: &str) -> String {
        debug!(question, "Mock chat");
        let question_lower = question.to_lowercase();

        if question_lower.contains("total") || question_lower.contains("amount") {
            "The total amount on this invoice is $2,712.50.".to_string()
        } else if question_lower.contains("vendor") || question_lower.contains("from") {
            "This invoice is from Acme Corporation, located at 456 Business Ave, \
             Commerce City, ST 67890."
                .to_string()
        } else if question_lower.contains("date") {
            "The invoice date is August 3, 2025, and it's due on September 2, 2025.".to_string()
        } else if question_lower.contains("items") || question_lower.contains("services") {
            "The invoice includes Professional Services (10 units at $150 each) and \
             Consulting Hours (5 units at $200 each)."
                .to_string()
        } else if question_lower.contains("tax") {
            "The tax amount is $212.50, calculated at 8.5% tax rate.".to_string()
        } else if question_lower.contains("customer") || question_lower.contains("bill") {
            "This invoice is billed to John Smith at 123 Main Street, Anytown, ST 12345."
                .to_string()
        } else {
            format!(
                "I can help you with questions about this invoice. You asked: '{question}'. \
                 The invoice contains information about the vendor (Acme Corporation), total \
                 amount ($2,712.50), line items, dates, and more. Please ask specific \
                 questions about these details."
            )
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// The canned invoice returned by every mock extraction.
fn canned_invoice() -> serde_json::Value {
    json!({
        "invoice_number": "INV-2025-001",
        "date": "2025-08-03",
        "vendor": "Acme Corporation",
        "vendor_address": "456 Business Ave, Commerce City, ST 67890",
        "customer": "John Smith",
        "customer_address": "123 Main Street, Anytown, ST 12345",
        "total_amount": 2712.50,
        "tax_amount": 212.50,
        "subtotal": 2500.00,
        "tax_rate": "8.5%",
        "currency": "USD",
        "items": [
            {
                "description": "Professional Services",
                "quantity": 10,
                "unit_price": 150.00,
                "total": 1500.00
            },
            {
                "description": "Consulting Hours",
                "quantity": 5,
                "unit_price": 200.00,
                "total": 1000.00
            }
        ],
        "payment_terms": "Net 30",
        "due_date": "2025-09-02",
        "confidence_score": 0.95
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> MockClient {
        MockClient::with_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_extract_returns_canned_invoice() {
        let result = client().extract(Path::new("any.png"), "prompt").await;

        assert!(result.successful());
        assert_eq!(result.get("invoice_number"), Some(&json!("INV-2025-001")));
        assert_eq!(result.get("vendor"), Some(&json!("Acme Corporation")));
        assert_eq!(result.get("total_amount"), Some(&json!(2712.50)));
        assert_eq!(result.extracted_by(), Some(ATTRIBUTION));
    }

    #[tokio::test]
    async fn test_chat_total_question() {
        let answer = client().chat("What is the total?", "").await;
        assert!(answer.contains("$2,712.50"));
    }

    #[tokio::test]
    async fn test_chat_vendor_question() {
        let answer = client().chat("who is the vendor", "").await;
        assert!(answer.contains("Acme Corporation"));
    }

    #[tokio::test]
    async fn test_chat_date_question() {
        let answer = client().chat("When is the due DATE?", "").await;
        assert!(answer.contains("September 2, 2025"));
    }

    #[tokio::test]
    async fn test_chat_tax_question() {
        let answer = client().chat("how much tax", "").await;
        assert!(answer.contains("$212.50"));
    }

    #[tokio::test]
    async fn test_chat_items_question() {
        let answer = client().chat("list the items", "").await;
        assert!(answer.contains("Professional Services"));
    }

    #[tokio::test]
    async fn test_chat_customer_question() {
        let answer = client().chat("who is billed?", "").await;
        assert!(answer.contains("John Smith"));
    }

    #[tokio::test]
    async fn test_chat_fallback_quotes_question() {
        let answer = client().chat("tell me a story", "").await;
        assert!(answer.contains("'tell me a story'"));
        assert!(answer.contains("Acme Corporation"));
    }
}
