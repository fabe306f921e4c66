use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn from_lookup_defaults_to_gemini() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("LLM_API_KEY_ENV", "TEST_KEY"), ("TEST_KEY", "secret")])).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Gemini);
    assert_eq!(cfg.model, "gemini-2.0-flash");
    assert_eq!(cfg.base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(
        cfg.timeouts,
        LlmTimeouts { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.api_key, "secret");
}

#[test]
fn from_lookup_parses_anthropic_overrides() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[
        ("LLM_PROVIDER", "anthropic"),
        ("LLM_API_KEY_ENV", "ANTHROPIC_API_KEY"),
        ("ANTHROPIC_API_KEY", "sk-test"),
        ("LLM_MODEL", "claude-haiku"),
        ("LLM_BASE_URL", "https://example.test/v1/"),
        ("LLM_REQUEST_TIMEOUT_SECS", "42"),
        ("LLM_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Anthropic);
    assert_eq!(cfg.model, "claude-haiku");
    assert_eq!(cfg.base_url, "https://example.test/v1");
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn from_lookup_bad_timeout_falls_back_to_default() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[
        ("LLM_API_KEY_ENV", "TEST_KEY"),
        ("TEST_KEY", "secret"),
        ("LLM_REQUEST_TIMEOUT_SECS", "soon"),
    ]))
    .unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_LLM_REQUEST_TIMEOUT_SECS);
}

#[test]
fn from_lookup_unknown_provider_errors() {
    let err = LlmConfig::from_lookup(lookup_from(&[
        ("LLM_PROVIDER", "bad"),
        ("LLM_API_KEY_ENV", "TEST_KEY"),
        ("TEST_KEY", "secret"),
    ]))
    .unwrap_err()
    .to_string();
    assert!(err.contains("unknown LLM_PROVIDER"));
}

#[test]
fn from_lookup_missing_key_env_errors() {
    let err = LlmConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { var } if var == "LLM_API_KEY_ENV"));
}

#[test]
fn from_lookup_blank_key_is_missing() {
    let err = LlmConfig::from_lookup(lookup_from(&[("LLM_API_KEY_ENV", "TEST_KEY"), ("TEST_KEY", "  ")])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { var } if var == "TEST_KEY"));
}
