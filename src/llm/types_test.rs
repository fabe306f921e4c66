use super::*;

// =============================================================================
// LlmError::error_code
// =============================================================================

#[test]
fn error_code_missing_api_key() {
    let err = LlmError::MissingApiKey { var: "KEY".into() };
    assert_eq!(err.error_code(), "E_MISSING_API_KEY");
}

#[test]
fn error_code_not_configured() {
    let err = LlmError::NotConfigured("no key".into());
    assert_eq!(err.error_code(), "E_LLM_NOT_CONFIGURED");
}

#[test]
fn error_code_empty_reply() {
    let err = LlmError::EmptyReply("SAFETY".into());
    assert_eq!(err.error_code(), "E_EMPTY_REPLY");
}

#[test]
fn error_display_includes_status() {
    let err = LlmError::ApiResponse { status: 503, body: "down".into() };
    assert_eq!(err.to_string(), "API response error: status 503");
}

// =============================================================================
// LlmError::retryable
// =============================================================================

#[test]
fn retryable_api_request() {
    assert!(LlmError::ApiRequest("conn refused".into()).retryable());
}

#[test]
fn retryable_api_response_429_and_5xx() {
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 502, body: String::new() }.retryable());
}

#[test]
fn not_retryable_client_errors() {
    assert!(!LlmError::ApiResponse { status: 400, body: String::new() }.retryable());
    assert!(!LlmError::ApiParse("json".into()).retryable());
    assert!(!LlmError::NotConfigured("x".into()).retryable());
}

// =============================================================================
// GenerationConfig::validate
// =============================================================================

fn config() -> GenerationConfig {
    GenerationConfig { max_output_tokens: 1000, temperature: 0.9, top_p: 0.9 }
}

#[test]
fn validate_accepts_defaults() {
    assert!(config().validate().is_ok());
}

#[test]
fn validate_rejects_zero_tokens() {
    let cfg = GenerationConfig { max_output_tokens: 0, ..config() };
    assert!(matches!(cfg.validate(), Err(LlmError::InvalidGeneration(_))));
}

#[test]
fn validate_rejects_top_p_above_one() {
    let cfg = GenerationConfig { top_p: 1.5, ..config() };
    let err = cfg.validate().unwrap_err().to_string();
    assert!(err.contains("top_p"));
}

#[test]
fn validate_rejects_negative_temperature() {
    let cfg = GenerationConfig { temperature: -0.1, ..config() };
    assert!(cfg.validate().is_err());
}

// =============================================================================
// Turn serde
// =============================================================================

#[test]
fn turn_role_serializes_lowercase() {
    let json = serde_json::to_value(Turn::model("hi")).unwrap();
    assert_eq!(json["role"], "model");
    assert_eq!(json["text"], "hi");
}
