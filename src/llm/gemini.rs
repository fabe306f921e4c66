//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper: the whole history is replayed on every call, since the
//! endpoint is stateless. Pure parsing in `parse_response` for testability.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::types::{GenerationConfig, LlmError, Role, Turn};

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
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
        let body = build_request(config, history, text);
        let url = format!("{}/models/{model}:generateContent", self.base_url);

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
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
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<ApiContent<'a>>,
    generation_config: ApiGenerationConfig,
}

#[derive(Serialize)]
struct ApiContent<'a> {
    role: &'static str,
    parts: [ApiPartRef<'a>; 1],
}

#[derive(Serialize)]
struct ApiPartRef<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// =============================================================================
// BUILDING / PARSING
// =============================================================================

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

fn build_request<'a>(config: &GenerationConfig, history: &'a [Turn], text: &'a str) -> ApiRequest<'a> {
    let mut contents: Vec<ApiContent<'a>> = history
        .iter()
        .map(|turn| ApiContent { role: wire_role(turn.role), parts: [ApiPartRef { text: &turn.text }] })
        .collect();
    contents.push(ApiContent { role: "user", parts: [ApiPartRef { text }] });

    ApiRequest {
        contents,
        generation_config: ApiGenerationConfig {
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        },
    }
}

fn parse_response(json: &str) -> Result<String, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(candidate) = api.candidates.into_iter().next() else {
        let reason = api
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".into());
        return Err(LlmError::EmptyReply(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyReply(candidate.finish_reason.unwrap_or_else(|| "empty candidate".into())));
    }
    Ok(text)
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
