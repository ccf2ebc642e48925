use anyhow::Result;
use async_trait::async_trait;

/// A chat-completion model treated as a text oracle.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Send one system/user exchange and return the assistant's text.
    /// Provider-reported errors surface as `Err` carrying the provider message.
    async fn complete(&self, system_prompt: &str, user_prompt: &str, model: &str)
        -> Result<String>;
}
