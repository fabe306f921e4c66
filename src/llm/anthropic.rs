//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/v1/messages`, text turns only. Pure parsing in
//! `parse_response` for testability.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::types::{GenerationConfig, LlmError, Role, Turn};

const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    pub async fn converse(
        &self,
        model: &str,
        config: &GenerationConfig,
        history: &[Turn],
        text: &str,
    ) -> Result<String, LlmError> {
        let body = build_request(model, config, history, text);

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    /// Thinking, tool use, and future block types carry no reply text.
    #[serde(other)]
    Unknown,
}

// =============================================================================
// BUILDING / PARSING
// =============================================================================

fn build_request<'a>(model: &'a str, config: &GenerationConfig, history: &'a [Turn], text: &'a str) -> ApiRequest<'a> {
    let mut messages: Vec<ApiMessage<'a>> = history
        .iter()
        .map(|turn| ApiMessage {
            role: match turn.role {
                Role::User => "user",
                Role::Model => "assistant",
            },
            content: &turn.text,
        })
        .collect();
    messages.push(ApiMessage { role: "user", content: text });

    ApiRequest {
        model,
        max_tokens: config.max_output_tokens,
        temperature: config.temperature,
        top_p: config.top_p,
        messages,
    }
}

fn parse_response(json: &str) -> Result<String, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let parts: Vec<String> = api
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Unknown => None,
        })
        .collect();

    if parts.is_empty() {
        return Err(LlmError::EmptyReply(api.stop_reason.unwrap_or_else(|| "no text blocks".into())));
    }
    Ok(parts.join("\n"))
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
