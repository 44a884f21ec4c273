//! Extraction prompt loading.
//!
//! The prompt is read from disk on every extraction (no caching), so edits
//! take effect without a restart. Any read failure falls back to the
//! built-in default.

use std::path::Path;

use tracing::warn;

/// Default invoice-extraction prompt, used when no prompt file is configured
/// or the configured file cannot be read.
pub const DEFAULT_EXTRACTION_PROMPT: &str = r#"Please analyze this invoice image and extract all relevant information in a structured JSON format.

Include the following information if available:
- Invoice number
- Date
- Due date
- Vendor/Supplier information (name, address, contact details)
- Bill to/Customer information (name, address)
- Line items (description, quantity, unit price, total)
- Subtotal
- Tax information
- Total amount
- Payment terms
- Any additional notes or special instructions

Structure the response as a valid JSON object with clear field names. If any information is not clearly visible or available, indicate it as null or "Not specified".

Example structure:
{
  "invoice_number": "INV-001",
  "date": "2023-12-01",
  "vendor": {
    "name": "Company Name",
    "address": "123 Main St, City, State"
  },
  "total_amount": 1000.00,
  "line_items": [
    {
      "description": "Product/Service",
      "quantity": 1,
      "unit_price": 1000.00,
      "total": 1000.00
    }
  ]
}"#;

/// Load the extraction prompt.
///
/// Returns the trimmed contents of `path`, or [`DEFAULT_EXTRACTION_PROMPT`]
/// when no path is configured or the file cannot be read.
pub async fn load_prompt(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return DEFAULT_EXTRACTION_PROMPT.to_string();
    };

    match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents.trim().to_string(),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "Failed to read prompt file, using default prompt"
            );
            DEFAULT_EXTRACTION_PROMPT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_no_path_uses_default() {
        let prompt = load_prompt(None).await;
        assert_eq!(prompt, DEFAULT_EXTRACTION_PROMPT);
    }

    #[tokio::test]
    async fn test_missing_file_uses_default() {
        let prompt = load_prompt(Some(Path::new("/nonexistent/prompt.txt"))).await;
        assert_eq!(prompt, DEFAULT_EXTRACTION_PROMPT);
    }

    #[tokio::test]
    async fn test_file_contents_are_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\n  Extract the invoice fields.  \n").unwrap();

        let prompt = load_prompt(Some(file.path())).await;
        assert_eq!(prompt, "Extract the invoice fields.");
    }

    #[test]
    fn test_default_prompt_describes_json_schema() {
        assert!(DEFAULT_EXTRACTION_PROMPT.contains("JSON"));
        assert!(DEFAULT_EXTRACTION_PROMPT.contains("invoice_number"));
        assert!(DEFAULT_EXTRACTION_PROMPT.contains("line_items"));
    }
}
