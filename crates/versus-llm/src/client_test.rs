use super::*;

fn test_client(base_url: &str) -> ChatClient {
    ChatClient::new("test-key", base_url, &ClientOptions::default())
        .expect("client construction should not fail")
}

#[test]
fn endpoint_appends_chat_completions() {
    let client = test_client("https://api.groq.com/openai/v1");
    assert_eq!(
        client.endpoint().as_str(),
        "https://api.groq.com/openai/v1/chat/completions"
    );
}

#[test]
fn endpoint_strips_trailing_slash() {
    let client = test_client("https://api.perplexity.ai/");
    assert_eq!(
        client.endpoint().as_str(),
        "https://api.perplexity.ai/chat/completions"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = ChatClient::new("k", "not a url", &ClientOptions::default());
    assert!(matches!(result, Err(LlmError::InvalidBaseUrl { .. })));
}

#[test]
fn error_message_from_nested_object() {
    let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;
    assert_eq!(extract_error_message(body).as_deref(), Some("Invalid API Key"));
}

#[test]
fn error_message_from_plain_string() {
    assert_eq!(
        extract_error_message(r#"{"error": "quota exhausted"}"#).as_deref(),
        Some("quota exhausted")
    );
}

#[test]
fn error_message_absent_for_non_json_body() {
    assert!(extract_error_message("<html>Bad Gateway</html>").is_none());
    assert!(extract_error_message(r#"{"detail": 1}"#).is_none());
}
