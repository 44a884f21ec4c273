//! Model client trait and startup selection.
//!
//! The live and mock variants are chosen by an explicit configuration flag.
//! `Provider::Auto` resolves to the live client exactly when credentials are
//! configured, which keeps the no-credentials development path working
//! without any network dependency.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::anthropic::{AnthropicClient, AnthropicConfig};
use crate::error::{ModelError, Result};
use crate::mock::MockClient;
use crate::types::ExtractionResult;

// ─────────────────────────────────────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────────────────────────────────────

/// The model-calling capability: invoice extraction plus follow-up chat.
///
/// Both methods absorb upstream errors. `extract` returns a failure-flagged
/// [`ExtractionResult`] instead of an `Err`; `chat` returns an apologetic
/// string. Handlers therefore never branch on transport errors.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Extract structured invoice data from the image at `image_path`.
    async fn extract(&self, image_path: &Path, prompt: &str) -> ExtractionResult;

    /// Answer a free-text question grounded in the given invoice context.
    async fn chat(&self, question: &str, context: &str) -> String;

    /// Short name of this client, for logs.
    fn name(&self) -> &str;
}

/// A client that can be shared across handlers.
pub type SharedModelClient = Arc<dyn ModelClient>;

// ─────────────────────────────────────────────────────────────────────────────
// Provider Selection
// ─────────────────────────────────────────────────────────────────────────────

/// Which model client to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Anthropic Messages API.
    Live,
    /// Canned offline client.
    Mock,
    /// Live if credentials are configured, mock otherwise.
    Auto,
}

impl Provider {
    /// Get the string name for this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Live => "live",
            Provider::Mock => "mock",
            Provider::Auto => "auto",
        }
    }

    /// Parse a provider from a string name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "live" | "anthropic" => Some(Provider::Live),
            "mock" => Some(Provider::Mock),
            "auto" => Some(Provider::Auto),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for client selection.
#[derive(Debug, Clone)]
pub struct ModelClientConfig {
    /// Selection flag.
    pub provider: Provider,

    /// Live client configuration, when credentials are available.
    pub anthropic: Option<AnthropicConfig>,

    /// Artificial delay for the mock client.
    pub mock_delay: Duration,
}

impl Default for ModelClientConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Auto,
            anthropic: None,
            mock_delay: Duration::from_secs(2),
        }
    }
}

impl ModelClientConfig {
    /// Create a new configuration with defaults (`auto`, no credentials).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider flag.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Configure the live client.
    pub fn with_anthropic(mut self, config: AnthropicConfig) -> Self {
        self.anthropic = Some(config);
        self
    }

    /// Set the mock delay.
    pub fn with_mock_delay(mut self, delay: Duration) -> Self {
        self.mock_delay = delay;
        self
    }

    /// Create configuration from environment variables: `MODEL_PROVIDER`
    /// (default `auto`) and `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let provider = match std::env::var("MODEL_PROVIDER") {
            Ok(name) => Provider::from_name(&name).ok_or_else(|| {
                ModelError::Config(format!("Unknown MODEL_PROVIDER value '{}'", name))
            })?,
            Err(_) => Provider::Auto,
        };

        Ok(Self {
            provider,
            anthropic: AnthropicConfig::from_env().ok(),
            ..Self::default()
        })
    }
}

/// Build the model client selected by the configuration.
///
/// `Provider::Live` without credentials is a configuration error;
/// `Provider::Auto` falls back to the mock client in that case.
pub fn build_client(config: ModelClientConfig) -> Result<SharedModelClient> {
    match config.provider {
        Provider::Mock => {
            info!("Using mock model client");
            Ok(Arc::new(MockClient::with_delay(config.mock_delay)))
        }
        Provider::Live => {
            let anthropic = config.anthropic.ok_or_else(|| {
                ModelError::Config(
                    "Live model client requested but no API key is configured".to_string(),
                )
            })?;
            info!(model = %anthropic.model, "Using Anthropic model client");
            Ok(Arc::new(AnthropicClient::new(anthropic)?))
        }
        Provider::Auto => match config.anthropic {
            Some(anthropic) => {
                info!(model = %anthropic.model, "Credentials found, using Anthropic model client");
                Ok(Arc::new(AnthropicClient::new(anthropic)?))
            }
            None => {
                info!("No credentials configured, falling back to mock model client");
                Ok(Arc::new(MockClient::with_delay(config.mock_delay)))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_name() {
        assert_eq!(Provider::from_name("live"), Some(Provider::Live));
        assert_eq!(Provider::from_name("Anthropic"), Some(Provider::Live));
        assert_eq!(Provider::from_name("MOCK"), Some(Provider::Mock));
        assert_eq!(Provider::from_name("auto"), Some(Provider::Auto));
        assert_eq!(Provider::from_name("openai"), None);
    }

    #[test]
    fn test_build_mock_client() {
        let config = ModelClientConfig::new()
            .with_provider(Provider::Mock)
            .with_mock_delay(Duration::ZERO);
        let client = build_client(config).unwrap();
        assert_eq!(client.name(), "mock");
    }

    #[test]
    fn test_build_live_client_requires_credentials() {
        let config = ModelClientConfig::new().with_provider(Provider::Live);
        let err = build_client(config).err().unwrap();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn test_auto_without_credentials_selects_mock() {
        let config = ModelClientConfig::new().with_provider(Provider::Auto);
        let client = build_client(config).unwrap();
        assert_eq!(client.name(), "mock");
    }

    #[test]
    fn test_auto_with_credentials_selects_live() {
        let config = ModelClientConfig::new()
            .with_provider(Provider::Auto)
            .with_anthropic(AnthropicConfig::new("test-key"));
        let client = build_client(config).unwrap();
        assert_eq!(client.name(), "anthropic");
    }
}
