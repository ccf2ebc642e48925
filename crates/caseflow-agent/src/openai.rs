use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use caseflow_core::agent::LlmBackend;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Any provider speaking the OpenAI `/chat/completions` protocol
/// (OpenAI, OpenRouter, vLLM, LM Studio, ...).
pub struct OpenAiBackend {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl OpenAiBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: 300,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: String,
}

pub fn chat_request(system_prompt: &str, user_prompt: &str, model: &str) -> ChatRequest {
    ChatRequest {
        model: model.into(),
        messages: vec![
            ChatMessage {
                role: "system".into(),
                content: system_prompt.into(),
            },
            ChatMessage {
                role: "user".into(),
                content: user_prompt.into(),
            },
        ],
    }
}

/// Pull the first choice's text out of a completion body. An `error`
/// envelope takes precedence over any choices.
pub fn parse_chat_response(body: &str) -> Result<String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).context("failed to parse completion response")?;
    if let Some(err) = parsed.error {
        let message = if err.message.is_empty() {
            "unspecified provider error".to_string()
        } else {
            err.message
        };
        bail!("{message}");
    }
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| anyhow!("completion response has no message content"))
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(&self, system_prompt: &str, user_prompt: &str, model: &str) -> Result<String> {
        let request_body = chat_request(system_prompt, user_prompt, model);

        info!(
            model = %model,
            base_url = %self.base_url,
            prompt_len = user_prompt.len(),
            "calling chat completions API"
        );

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let client = crate::http_client(self.timeout_secs)?;

        let mut request = client.post(&url).json(&request_body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(timeout_secs = self.timeout_secs, "completion request timed out");
                bail!("completion request timed out after {}s", self.timeout_secs);
            },
            Err(e) => {
                warn!("completion request failed: {}", e);
                bail!("completion request failed: {e}");
            },
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = %status, body_len = body.len(), "provider returned non-200");
            let detail = serde_json::from_str::<ChatResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or(body);
            bail!("HTTP {status}: {detail}");
        }

        let output = parse_chat_response(&body)?;
        info!(model = %model, output_len = output.len(), "completion received");
        Ok(output)
    }
}
