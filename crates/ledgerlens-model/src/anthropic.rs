//! Anthropic Messages API client for invoice extraction and chat.
//!
//! Sends a single request per operation: extraction submits the image as a
//! base64 content block alongside the prompt; chat submits one text prompt
//! embedding the stored invoice context. No retries are attempted — a failed
//! call surfaces as a failure-flagged result at the trait boundary.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Response, header};
use tracing::{debug, info, warn};

use crate::client::ModelClient;
use crate::error::{ModelError, Result};
use crate::types::ExtractionResult;

/// Default API base URL.
const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

/// Default API version.
const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Default model identifier.
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

/// Default timeout for requests.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Token budget for extraction answers.
const EXTRACTION_MAX_TOKENS: u32 = 4000;

/// Token budget for chat answers.
const CHAT_MAX_TOKENS: u32 = 2000;

const EXTRACTION_TEMPERATURE: f32 = 0.1;
const CHAT_TEMPERATURE: f32 = 0.3;

const EXTRACTION_SYSTEM_PROMPT: &str = "You are a professional invoice data extraction assistant. \
     Always respond with valid JSON format.";

/// Attribution recorded in extraction results produced by this client.
const ATTRIBUTION: &str = "Anthropic Claude Vision";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the Anthropic client.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API.
    pub base_url: String,

    /// API version header.
    pub api_version: String,

    /// Model identifier.
    pub model: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create config from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            ModelError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Live Anthropic Messages API client.
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// Create a new client with the given configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a client from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(AnthropicConfig::from_env()?)
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    fn add_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .header(header::CONTENT_TYPE, "application/json")
    }

    /// Send a messages request and return the first text block of the answer.
    async fn send(&self, request: &ApiRequest) -> Result<String> {
        let response = self
            .add_headers(self.client.post(self.messages_url()))
            .json(request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response(response: Response) -> Result<String> {
        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let body = response.text().await?;
        let parsed: ApiResponse =
            serde_json::from_str(&body).map_err(|e| ModelError::Serialization(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text)
            .ok_or_else(|| ModelError::Backend("Response contained no text content".to_string()))
    }

    async fn handle_error_response(response: Response) -> ModelError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Ok(error) = serde_json::from_str::<ApiError>(&body) {
            match status.as_u16() {
                401 => ModelError::Auth(format!("Authentication failed: {}", error.error.message)),
                500..=599 => ModelError::Backend(format!("Server error: {}", error.error.message)),
                _ => ModelError::Backend(error.error.message),
            }
        } else {
            ModelError::Backend(format!("HTTP {}: {}", status, body))
        }
    }

    async fn try_extract(&self, image_path: &Path, prompt: &str) -> Result<String> {
        let bytes = tokio::fs::read(image_path).await?;
        let data = STANDARD.encode(&bytes);
        let media_type = media_type_for_path(image_path);
        debug!(
            path = %image_path.display(),
            media_type,
            encoded_len = data.len(),
            "Encoded invoice image"
        );

        let request = ApiRequest {
            model: self.config.model.clone(),
            max_tokens: EXTRACTION_MAX_TOKENS,
            system: Some(EXTRACTION_SYSTEM_PROMPT.to_string()),
            temperature: EXTRACTION_TEMPERATURE,
            messages: vec![ApiMessage {
                role: "user",
                content: vec![
                    ContentPart::Image {
                        source: ImageSource {
                            source_type: "base64",
                            media_type,
                            data,
                        },
                    },
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        };

        info!(model = %self.config.model, "Requesting invoice extraction");
        self.send(&request).await
    }

    async fn try_chat(&self, question: &str, context: &str) -> Result<String> {
        let request = ApiRequest {
            model: self.config.model.clone(),
            max_tokens: CHAT_MAX_TOKENS,
            system: None,
            temperature: CHAT_TEMPERATURE,
            messages: vec![ApiMessage {
                role: "user",
                content: vec![ContentPart::Text {
                    text: chat_prompt(question, context),
                }],
            }],
        };

        self.send(&request).await
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn extract(&self, image_path: &Path, prompt: &str) -> ExtractionResult {
        match self.try_extract(image_path, prompt).await {
            Ok(text) => ExtractionResult::from_model_text(&text, ATTRIBUTION),
            Err(err) => {
                warn!(error = %err, "Invoice extraction failed");
                ExtractionResult::failure(err, ATTRIBUTION)
            }
        }
    }

    async fn chat(&self, question: &str, context: &str) -> String {
        match self.try_chat(question, context).await {
            Ok(answer) => answer,
            Err(err) => {
                warn!(error = %err, "Chat request failed");
                format!(
                    "Sorry, I encountered an error while processing your question: {}",
                    err
                )
            }
        }
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Media type inferred from the file extension. JPEG is the fallback for
/// anything unrecognized.
fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// Single prompt embedding the invoice context and the user's question.
fn chat_prompt(question: &str, context: &str) -> String {
    format!(
        "Based on the following invoice data, please answer the user's question \
         accurately and concisely.\n\n\
         Invoice Data:\n{context}\n\n\
         User Question: {question}\n\n\
         Please provide a helpful and accurate answer based only on the information \
         available in the invoice data. If the information is not available in the \
         invoice, please say so clearly."
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    temperature: f32,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, serde::Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, serde::Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Debug, serde::Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, serde::Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, serde::Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_inference() {
        assert_eq!(media_type_for_path(Path::new("a.png")), "image/png");
        assert_eq!(media_type_for_path(Path::new("a.PNG")), "image/png");
        assert_eq!(media_type_for_path(Path::new("a.gif")), "image/gif");
        assert_eq!(media_type_for_path(Path::new("a.webp")), "image/webp");
        assert_eq!(media_type_for_path(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("a.jpeg")), "image/jpeg");
        // Unrecognized extensions fall back to JPEG
        assert_eq!(media_type_for_path(Path::new("a.bmp")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("noext")), "image/jpeg");
    }

    #[test]
    fn test_chat_prompt_embeds_context_and_question() {
        let prompt = chat_prompt("What is the total?", "{\"total\": 10}");
        assert!(prompt.contains("Invoice Data:\n{\"total\": 10}"));
        assert!(prompt.contains("User Question: What is the total?"));
    }

    #[test]
    fn test_image_request_wire_shape() {
        let request = ApiRequest {
            model: "test-model".to_string(),
            max_tokens: 100,
            system: Some("sys".to_string()),
            temperature: 0.1,
            messages: vec![ApiMessage {
                role: "user",
                content: vec![ContentPart::Image {
                    source: ImageSource {
                        source_type: "base64",
                        media_type: "image/png",
                        data: "AAAA".to_string(),
                    },
                }],
            }],
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
        let block = &json["messages"][0]["content"][0];
        assert_eq!(block["type"], "image");
        assert_eq!(block["source"]["type"], "base64");
        assert_eq!(block["source"]["media_type"], "image/png");
        assert_eq!(block["source"]["data"], "AAAA");
    }

    #[test]
    fn test_system_field_omitted_when_none() {
        let request = ApiRequest {
            model: "test-model".to_string(),
            max_tokens: 100,
            system: None,
            temperature: 0.3,
            messages: vec![],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("system"));
    }

    #[test]
    fn test_config_builders() {
        let config = AnthropicConfig::new("key")
            .with_base_url("http://localhost:9999")
            .with_model("claude-test")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.api_key, "key");
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.model, "claude-test");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_extract_absorbs_unreadable_image() {
        let client = AnthropicClient::new(AnthropicConfig::new("key")).unwrap();
        let result = client
            .extract(Path::new("/nonexistent/invoice.png"), "prompt")
            .await;

        assert!(!result.successful());
        assert!(result.error().is_some());
        assert_eq!(result.extracted_by(), Some("Anthropic Claude Vision (failed)"));
    }
}
