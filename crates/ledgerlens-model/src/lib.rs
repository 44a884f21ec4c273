//! Vision-model client abstraction for LedgerLens.
//!
//! This crate provides the capability interface for invoice extraction and
//! follow-up chat, with two interchangeable implementations selected at
//! startup:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ModelClient trait                          │
//! │  - extract(image, prompt) -> Extraction     │
//! │  - chat(question, context) -> String        │
//! └─────────────────────────────────────────────┘
//!                    │
//!          ┌─────────┴─────────┐
//!          ▼                   ▼
//!    ┌───────────┐       ┌──────────┐
//!    │ Anthropic │       │   Mock   │
//!    └───────────┘       └──────────┘
//! ```
//!
//! Both variants absorb upstream failures at the trait surface: `extract`
//! always returns an [`ExtractionResult`] (failed extractions carry
//! `extraction_successful: false`), and `chat` always returns a string.
//! Callers branch on the embedded status, never on a transport error.

pub mod anthropic;
pub mod client;
pub mod error;
pub mod mock;
pub mod prompt;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use client::{ModelClient, ModelClientConfig, Provider, SharedModelClient, build_client};
pub use error::{ModelError, Result};
pub use mock::MockClient;
pub use prompt::{DEFAULT_EXTRACTION_PROMPT, load_prompt};
pub use types::ExtractionResult;
