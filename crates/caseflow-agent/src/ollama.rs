use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use caseflow_core::agent::LlmBackend;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Calls a locally-hosted Ollama model via its native chat API.
///
/// Case files never leave the machine with this backend, which suits
/// deployments where debtor data must stay on-premises.
pub struct OllamaBackend {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 300,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct OllamaMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    pub stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaResponseMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

/// Non-streaming request body; the system message is omitted when empty.
pub fn chat_request(system_prompt: &str, user_prompt: &str, model: &str) -> OllamaChatRequest {
    let mut messages = Vec::new();
    if !system_prompt.is_empty() {
        messages.push(OllamaMessage {
            role: "system".into(),
            content: system_prompt.into(),
        });
    }
    messages.push(OllamaMessage {
        role: "user".into(),
        content: user_prompt.into(),
    });
    OllamaChatRequest {
        model: model.into(),
        messages,
        stream: false,
    }
}

/// Pull the assistant text out of an `/api/chat` response body.
pub fn parse_chat_response(body: &str) -> Result<String> {
    let parsed: OllamaChatResponse =
        serde_json::from_str(body).context("failed to parse ollama response")?;
    if let Some(err) = parsed.error {
        bail!("ollama: {err}");
    }
    parsed
        .message
        .map(|m| m.content)
        .ok_or_else(|| anyhow!("ollama response has no message"))
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn complete(&self, system_prompt: &str, user_prompt: &str, model: &str) -> Result<String> {
        let request_body = chat_request(system_prompt, user_prompt, model);

        info!(
            model = %model,
            base_url = %self.base_url,
            prompt_len = user_prompt.len(),
            "calling ollama chat API"
        );

        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let client = crate::http_client(self.timeout_secs)?;

        let response = match client.post(&url).json(&request_body).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(timeout_secs = self.timeout_secs, "ollama request timed out");
                bail!("ollama request timed out after {}s", self.timeout_secs);
            },
            Err(e) => {
                warn!("ollama request failed: {}", e);
                bail!("ollama request failed: {e}");
            },
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = %status, "ollama returned non-200: {}", body);
            let detail = serde_json::from_str::<OllamaChatResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(body);
            bail!("ollama HTTP {status}: {detail}");
        }

        let output = parse_chat_response(&body)?;
        info!(model = %model, output_len = output.len(), "ollama response received");
        Ok(output)
    }
}
