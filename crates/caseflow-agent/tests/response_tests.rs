use caseflow_agent::{ollama, openai};

// ── openai-compatible ────────────────────────────────────────────────────

#[test]
fn test_openai_first_choice_content() {
    let body = r#"{
        "id": "chatcmpl-1",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "{\"status_flag\": \"GREEN\"}"}},
            {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
        ]
    }"#;
    let text = openai::parse_chat_response(body).unwrap();
    assert_eq!(text, r#"{"status_flag": "GREEN"}"#);
}

#[test]
fn test_openai_error_envelope_carries_message() {
    let body = r#"{"error": {"message": "Rate limit exceeded", "code": 429}}"#;
    let err = openai::parse_chat_response(body).unwrap_err();
    assert_eq!(err.to_string(), "Rate limit exceeded");
}

#[test]
fn test_openai_error_wins_over_choices() {
    let body = r#"{"error": {"message": "quota"}, "choices": [{"message": {"content": "hi"}}]}"#;
    assert!(openai::parse_chat_response(body).is_err());
}

#[test]
fn test_openai_empty_error_message() {
    let err = openai::parse_chat_response(r#"{"error": {"code": 500}}"#).unwrap_err();
    assert_eq!(err.to_string(), "unspecified provider error");
}

#[test]
fn test_openai_missing_content_is_error() {
    assert!(openai::parse_chat_response(r#"{"choices": []}"#).is_err());
    assert!(openai::parse_chat_response(r#"{"choices": [{"message": {"content": null}}]}"#).is_err());
    assert!(openai::parse_chat_response("<html>bad gateway</html>").is_err());
}

#[test]
fn test_openai_request_shape() {
    let req = openai::chat_request("be precise", "analyze this", "gpt-4o-mini");
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["model"], "gpt-4o-mini");
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][0]["content"], "be precise");
    assert_eq!(json["messages"][1]["role"], "user");
    assert_eq!(json["messages"][1]["content"], "analyze this");
}

// ── ollama ───────────────────────────────────────────────────────────────

#[test]
fn test_ollama_message_content() {
    let body = r##"{"model": "llama3", "message": {"role": "assistant", "content": "# ORDER"}, "done": true}"##;
    assert_eq!(ollama::parse_chat_response(body).unwrap(), "# ORDER");
}

#[test]
fn test_ollama_error_field() {
    let err = ollama::parse_chat_response(r#"{"error": "model 'x' not found"}"#).unwrap_err();
    assert_eq!(err.to_string(), "ollama: model 'x' not found");
}

#[test]
fn test_ollama_request_skips_empty_system() {
    let req = ollama::chat_request("", "hello", "llama3");
    assert_eq!(req.messages.len(), 1);
    assert_eq!(req.messages[0].role, "user");
    assert!(!req.stream);
}
