//! LedgerLens - invoice extraction and chat web service.
//!
//! Main entry point: loads configuration from the environment, applies CLI
//! overrides, selects the model client, and runs the HTTP server.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ledgerlens_config::{AppConfig, init_tracing};
use ledgerlens_model::{AnthropicConfig, ModelClientConfig, Provider, build_client};
use ledgerlens_server::{Server, ServerConfig};

/// LedgerLens - invoice extraction and chat web service.
///
/// CLI arguments override environment configuration.
#[derive(Parser)]
#[command(name = "ledgerlens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Host to bind to (overrides LEDGERLENS_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides LEDGERLENS_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Upload directory (overrides LEDGERLENS_UPLOAD_DIR)
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Extraction prompt file (overrides LEDGERLENS_PROMPT)
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Model provider: live, mock, or auto (overrides MODEL_PROVIDER)
    #[arg(long)]
    provider: Option<String>,

    /// Model identifier (overrides LEDGERLENS_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Mock client delay in milliseconds (overrides MOCK_DELAY_MS)
    #[arg(long)]
    mock_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("loading configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dir) = cli.upload_dir {
        config.upload_dir = dir;
    }
    if let Some(prompt) = cli.prompt_file {
        config.prompt_path = Some(prompt);
    }
    if let Some(provider) = cli.provider {
        config.model_provider = provider;
    }
    if let Some(model) = cli.model {
        config.model = Some(model);
    }
    if let Some(delay) = cli.mock_delay_ms {
        config.mock_delay_ms = delay;
    }

    let default_level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_tracing(default_level);

    let client = build_client(model_client_config(&config)?)
        .context("building model client")?;
    info!(client = client.name(), "Model client selected");

    // The upload directory must exist before the first request.
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload directory {}", config.upload_dir.display()))?;

    let bind_address = config
        .bind_addr()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_addr()))?;

    let mut server_config = ServerConfig::new()
        .with_bind_address(bind_address)
        .with_upload_dir(&config.upload_dir)
        .with_max_body_size(config.max_body_size)
        .with_session_ttl(Duration::from_secs(config.session_ttl_secs));
    if let Some(prompt) = &config.prompt_path {
        server_config = server_config.with_prompt_path(prompt);
    }
    if let Some(secret) = &config.session_secret {
        server_config = server_config.with_cookie_secret(secret);
    }

    info!(addr = %bind_address, "Starting LedgerLens");
    Server::new(client, server_config).run().await?;

    Ok(())
}

/// Map environment configuration to the model-client selection config.
fn model_client_config(config: &AppConfig) -> Result<ModelClientConfig> {
    let provider = Provider::from_name(&config.model_provider)
        .with_context(|| format!("unknown model provider '{}'", config.model_provider))?;

    let anthropic = config.anthropic_api_key.as_ref().map(|key| {
        let mut anthropic = AnthropicConfig::new(key);
        if let Some(model) = &config.model {
            anthropic = anthropic.with_model(model);
        }
        anthropic
    });

    let mut client_config = ModelClientConfig::new()
        .with_provider(provider)
        .with_mock_delay(Duration::from_millis(config.mock_delay_ms));
    if let Some(anthropic) = anthropic {
        client_config = client_config.with_anthropic(anthropic);
    }

    Ok(client_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            upload_dir: PathBuf::from("uploads"),
            prompt_path: None,
            max_body_size: 16 * 1024 * 1024,
            session_ttl_secs: 3600,
            session_secret: None,
            model_provider: "auto".to_string(),
            anthropic_api_key: None,
            model: None,
            mock_delay_ms: 0,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_auto_without_key_builds_mock() {
        let client_config = model_client_config(&base_config()).unwrap();
        let client = build_client(client_config).unwrap();
        assert_eq!(client.name(), "mock");
    }

    #[test]
    fn test_key_and_model_flow_into_live_client() {
        let mut config = base_config();
        config.model_provider = "live".to_string();
        config.anthropic_api_key = Some("test-key".to_string());
        config.model = Some("claude-test".to_string());

        let client_config = model_client_config(&config).unwrap();
        assert_eq!(client_config.provider, Provider::Live);
        let anthropic = client_config.anthropic.as_ref().unwrap();
        assert_eq!(anthropic.api_key, "test-key");
        assert_eq!(anthropic.model, "claude-test");
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let mut config = base_config();
        config.model_provider = "openai".to_string();
        assert!(model_client_config(&config).is_err());
    }
}
