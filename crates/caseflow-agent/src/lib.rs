pub mod ollama;
pub mod openai;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

use std::sync::Arc;

use anyhow::{bail, Result};
use caseflow_core::{agent::LlmBackend, config::Config};

/// Build the backend selected by `LLM_BACKEND`.
pub fn backend_from_config(config: &Config) -> Result<Arc<dyn LlmBackend>> {
    let timeout_secs = config.call_timeout_s;
    match config.llm_backend.as_str() {
        "openai" => Ok(Arc::new(
            OpenAiBackend::new(&config.llm_base_url, &config.llm_api_key)
                .with_timeout(timeout_secs),
        )),
        "ollama" => Ok(Arc::new(
            OllamaBackend::new(&config.llm_base_url).with_timeout(timeout_secs),
        )),
        other => bail!("unknown LLM_BACKEND: {other} (expected openai or ollama)"),
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}
