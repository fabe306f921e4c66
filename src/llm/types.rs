//! LLM types: provider-neutral turns, generation settings, and errors.
//!
//! Shared by the Gemini and Anthropic clients and by the session layer, which
//! only ever talks to the [`Backend`] trait.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// No backend was configured at startup.
    #[error("LLM not configured: {0}")]
    NotConfigured(String),

    /// Generation settings outside the range the provider accepts.
    #[error("invalid generation config: {0}")]
    InvalidGeneration(String),

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The provider answered but produced no text (blocked or empty candidate).
    #[error("empty reply: {0}")]
    EmptyReply(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::NotConfigured(_) => "E_LLM_NOT_CONFIGURED",
            Self::InvalidGeneration(_) => "E_INVALID_GENERATION",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::EmptyReply(_) => "E_EMPTY_REPLY",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// GENERATION SETTINGS
// =============================================================================

/// Sampling parameters sent with every request of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl GenerationConfig {
    /// Reject values no provider accepts.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::InvalidGeneration`] naming the offending field.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.max_output_tokens == 0 {
            return Err(LlmError::InvalidGeneration("max_output_tokens must be > 0".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LlmError::InvalidGeneration(format!(
                "temperature {} outside 0.0..=2.0",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(LlmError::InvalidGeneration(format!("top_p {} outside 0.0..=1.0", self.top_p)));
        }
        Ok(())
    }
}

// =============================================================================
// TURNS
// =============================================================================

/// Who produced a turn in the server-side conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One entry of the history replayed to the provider on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// Provider-neutral generative backend. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Prepare a new conversation with the given settings.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] when the backend is unreachable or misconfigured.
    async fn start(&self, config: &GenerationConfig) -> Result<(), LlmError>;

    /// Send `text` as the next user turn after `history` and return the full reply.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the response is unusable.
    async fn converse(&self, config: &GenerationConfig, history: &[Turn], text: &str) -> Result<String, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
