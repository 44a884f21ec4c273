//! Extraction result type.
//!
//! The model is asked to answer with a JSON object describing the invoice.
//! Its field set is model-dependent, so the result is a thin wrapper over a
//! JSON object rather than a fixed struct. Two bookkeeping fields are always
//! present: `extraction_successful` and `extracted_by`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field recording whether the extraction produced parseable JSON.
pub const FIELD_SUCCESS: &str = "extraction_successful";

/// Field identifying the client that produced the result.
pub const FIELD_ATTRIBUTION: &str = "extracted_by";

/// Field carrying the unparsed model answer when JSON parsing failed.
pub const FIELD_RAW: &str = "raw_extraction";

/// Field carrying a human-readable failure description.
pub const FIELD_ERROR: &str = "error";

/// Field carrying the JSON parse error, when that is what failed.
pub const FIELD_JSON_ERROR: &str = "json_error";

/// Structured data extracted from an invoice image, or a failure-wrapped
/// fallback.
///
/// Constructed through [`ExtractionResult::from_model_text`] (parse the
/// model's answer, degrading to a raw-text wrapper on parse failure) or
/// [`ExtractionResult::failure`] (transport/auth errors). Callers branch on
/// [`successful`](ExtractionResult::successful) rather than on a `Result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    fields: Map<String, Value>,
}

impl ExtractionResult {
    /// Build a result from the model's answer text.
    ///
    /// If the text parses as a JSON object it is annotated with the success
    /// flag and attribution and returned as-is. Anything else (invalid JSON,
    /// or valid JSON that is not an object) degrades to the raw-text wrapper
    /// with `extraction_successful: false`.
    pub fn from_model_text(text: &str, attribution: &str) -> Self {
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(Value::Object(mut fields)) => {
                fields.insert(FIELD_SUCCESS.to_string(), Value::Bool(true));
                fields.insert(
                    FIELD_ATTRIBUTION.to_string(),
                    Value::String(attribution.to_string()),
                );
                Self { fields }
            }
            Ok(other) => Self::unparsable(
                text,
                format!("expected a JSON object, got {}", json_type_name(&other)),
                attribution,
            ),
            Err(err) => Self::unparsable(text, err.to_string(), attribution),
        }
    }

    /// Build a failed result from an upstream error (transport, auth, I/O).
    pub fn failure(error: impl std::fmt::Display, attribution: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(FIELD_ERROR.to_string(), Value::String(error.to_string()));
        fields.insert(FIELD_SUCCESS.to_string(), Value::Bool(false));
        fields.insert(
            FIELD_ATTRIBUTION.to_string(),
            Value::String(format!("{} (failed)", attribution)),
        );
        Self { fields }
    }

    fn unparsable(text: &str, json_error: String, attribution: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(FIELD_RAW.to_string(), Value::String(text.to_string()));
        fields.insert(FIELD_SUCCESS.to_string(), Value::Bool(false));
        fields.insert(
            FIELD_ERROR.to_string(),
            Value::String("Response was not in valid JSON format".to_string()),
        );
        fields.insert(FIELD_JSON_ERROR.to_string(), Value::String(json_error));
        fields.insert(
            FIELD_ATTRIBUTION.to_string(),
            Value::String(attribution.to_string()),
        );
        Self { fields }
    }

    /// Whether the extraction produced parseable JSON.
    ///
    /// A missing flag counts as success, matching the read side of the
    /// contract (callers treat absence as "nothing went wrong").
    pub fn successful(&self) -> bool {
        self.fields
            .get(FIELD_SUCCESS)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// The unparsed model answer, present only when JSON parsing failed.
    pub fn raw_extraction(&self) -> Option<&str> {
        self.fields.get(FIELD_RAW).and_then(Value::as_str)
    }

    /// The failure description, present on any failed result.
    pub fn error(&self) -> Option<&str> {
        self.fields.get(FIELD_ERROR).and_then(Value::as_str)
    }

    /// The attribution string identifying the extracting client.
    pub fn extracted_by(&self) -> Option<&str> {
        self.fields.get(FIELD_ATTRIBUTION).and_then(Value::as_str)
    }

    /// Look up an arbitrary field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field names, in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The result as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Pretty-printed JSON for display and for chat context.
    pub fn to_pretty_string(&self) -> String {
        let value = Value::Object(self.fields.clone());
        match serde_json::to_string_pretty(&value) {
            Ok(s) => s,
            Err(_) => value.to_string(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_json_object_is_annotated() {
        let text = r#"{"invoice_number": "INV-001", "total_amount": 42.5}"#;
        let result = ExtractionResult::from_model_text(text, "test client");

        assert!(result.successful());
        assert_eq!(result.get("invoice_number"), Some(&json!("INV-001")));
        assert_eq!(result.get("total_amount"), Some(&json!(42.5)));
        assert_eq!(result.extracted_by(), Some("test client"));
        assert!(result.raw_extraction().is_none());
    }

    #[test]
    fn test_unparsable_text_wraps_raw() {
        let text = "The invoice total appears to be $42.50.";
        let result = ExtractionResult::from_model_text(text, "test client");

        assert!(!result.successful());
        assert_eq!(result.raw_extraction(), Some(text));
        assert_eq!(result.error(), Some("Response was not in valid JSON format"));
        assert!(result.get(FIELD_JSON_ERROR).is_some());
        assert_eq!(result.extracted_by(), Some("test client"));
    }

    #[test]
    fn test_non_object_json_wraps_raw() {
        let result = ExtractionResult::from_model_text("[1, 2, 3]", "test client");

        assert!(!result.successful());
        assert_eq!(result.raw_extraction(), Some("[1, 2, 3]"));
        let json_error = result.get(FIELD_JSON_ERROR).unwrap().as_str().unwrap();
        assert!(json_error.contains("an array"));
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        let result = ExtractionResult::from_model_text("  {\"a\": 1}\n", "test client");
        assert!(result.successful());
        assert_eq!(result.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_failure_shape() {
        let result = ExtractionResult::failure("connection refused", "test client");

        assert!(!result.successful());
        assert_eq!(result.error(), Some("connection refused"));
        assert_eq!(result.extracted_by(), Some("test client (failed)"));
        assert!(result.raw_extraction().is_none());
    }

    #[test]
    fn test_pretty_string_round_trips() {
        let result =
            ExtractionResult::from_model_text(r#"{"vendor": "Acme", "total": 10}"#, "test client");
        let parsed: Value = serde_json::from_str(&result.to_pretty_string()).unwrap();
        assert_eq!(parsed, result.to_value());
    }

    #[test]
    fn test_model_answer_success_flag_is_overwritten() {
        // The model cannot claim failure on its own behalf.
        let text = r#"{"extraction_successful": false}"#;
        let result = ExtractionResult::from_model_text(text, "test client");
        assert!(result.successful());
    }
}
