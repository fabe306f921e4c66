//! LLM: generative backend adapters for the assistant widget.
//!
//! DESIGN
//! ======
//! Configured from environment variables. `LlmClient` dispatches to Gemini or
//! Anthropic based on `LLM_PROVIDER`; everything above this module sees only
//! the [`Backend`] trait, so the widget never depends on a wire format.

pub mod anthropic;
pub mod config;
pub mod gemini;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
pub use types::Backend;
use types::{GenerationConfig, LlmError, Turn};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to either Gemini or Anthropic.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
}

enum LlmProvider {
    Gemini(gemini::GeminiClient),
    Anthropic(anthropic::AnthropicClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let model = config.model.clone();
        let inner = match config.provider {
            LlmProviderKind::Gemini => {
                LlmProvider::Gemini(gemini::GeminiClient::new(config.api_key, config.base_url, config.timeouts)?)
            }
            LlmProviderKind::Anthropic => LlmProvider::Anthropic(anthropic::AnthropicClient::new(
                config.api_key,
                config.base_url,
                config.timeouts,
            )?),
        };
        Ok(Self { inner, model })
    }

    /// Return the configured model name (e.g. `"gemini-2.0-flash"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl Backend for LlmClient {
    async fn start(&self, config: &GenerationConfig) -> Result<(), LlmError> {
        config.validate()
    }

    async fn converse(&self, config: &GenerationConfig, history: &[Turn], text: &str) -> Result<String, LlmError> {
        match &self.inner {
            LlmProvider::Gemini(c) => c.converse(&self.model, config, history, text).await,
            LlmProvider::Anthropic(c) => c.converse(&self.model, config, history, text).await,
        }
    }
}

// =============================================================================
// UNCONFIGURED
// =============================================================================

/// Stand-in used when no LLM config is available at startup.
///
/// Every conversation start fails, so the widget stays usable but answers each
/// question with its apology.
pub struct Unconfigured {
    reason: String,
}

impl Unconfigured {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait::async_trait]
impl Backend for Unconfigured {
    async fn start(&self, _config: &GenerationConfig) -> Result<(), LlmError> {
        Err(LlmError::NotConfigured(self.reason.clone()))
    }

    async fn converse(&self, _config: &GenerationConfig, _history: &[Turn], _text: &str) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured(self.reason.clone()))
    }
}
