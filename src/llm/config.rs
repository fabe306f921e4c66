//! LLM configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Gemini,
    Anthropic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// Required:
    /// - `LLM_API_KEY_ENV` (names the env var containing the key)
    ///
    /// Optional:
    /// - `LLM_PROVIDER`: `gemini` (default) or `anthropic`
    /// - `LLM_MODEL`: provider default when absent
    /// - `LLM_BASE_URL`: provider default when absent
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LlmConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or a value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let provider = parse_provider(lookup("LLM_PROVIDER").as_deref())?;

        let key_var = lookup("LLM_API_KEY_ENV").ok_or_else(|| LlmError::MissingApiKey { var: "LLM_API_KEY_ENV".into() })?;
        let api_key = lookup(&key_var)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey { var: key_var.clone() })?;

        let model = lookup("LLM_MODEL").unwrap_or_else(|| default_model(provider).to_string());
        let base_url = lookup("LLM_BASE_URL")
            .unwrap_or_else(|| default_base_url(provider).to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = LlmTimeouts {
            request_secs: parse_u64(&lookup, "LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(&lookup, "LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { provider, api_key, model, base_url, timeouts })
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_provider(raw: Option<&str>) -> Result<LlmProviderKind, LlmError> {
    match raw.unwrap_or("gemini") {
        "gemini" => Ok(LlmProviderKind::Gemini),
        "anthropic" => Ok(LlmProviderKind::Anthropic),
        other => Err(LlmError::ConfigParse(format!("unknown LLM_PROVIDER: {other}"))),
    }
}

fn default_model(provider: LlmProviderKind) -> &'static str {
    match provider {
        // `gemini-pro` is retired on v1beta; `LLM_MODEL` overrides.
        LlmProviderKind::Gemini => "gemini-2.0-flash",
        LlmProviderKind::Anthropic => "claude-sonnet-4-5-20250929",
    }
}

fn default_base_url(provider: LlmProviderKind) -> &'static str {
    match provider {
        LlmProviderKind::Gemini => DEFAULT_GEMINI_BASE_URL,
        LlmProviderKind::Anthropic => DEFAULT_ANTHROPIC_BASE_URL,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
