use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::render::{Alignment, DocumentStyle};

/// Full application configuration.
/// Read from the process environment, falling back to a local `.env` file.
#[derive(Debug, Clone)]
pub struct Config {
    // Web
    pub web_bind: String,
    pub web_port: u16,

    // LLM
    /// "openai" (any OpenAI-compatible chat completions API) or "ollama".
    pub llm_backend: String,
    pub llm_base_url: String,
    pub llm_api_key: String,
    pub model: String,
    /// Name of the prompt set to load, e.g. "collection".
    pub prompt_set: String,
    /// Upper bound for every individual external call.
    pub call_timeout_s: u64,

    // Storage
    pub source_bucket: String,
    pub output_bucket: String,
    /// Empty means the provider's default AWS endpoint.
    pub storage_endpoint: String,
    pub storage_region: String,
    pub storage_public_url: String,

    // Database
    pub database_url: String,
    pub cases_table: String,

    /// "pretty" (default) or "json".
    pub log_format: String,

    pub document_style: DocumentStyle,
}

fn parse_dotenv() -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return map;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    map
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_u64(key: &str, dotenv: &HashMap<String, String>, default: u64) -> u64 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_u16(key: &str, dotenv: &HashMap<String, String>, default: u16) -> u16 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_f32(key: &str, dotenv: &HashMap<String, String>, default: f32) -> f32 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .filter(|v: &f32| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}

fn get_alignment(
    key: &str,
    dotenv: &HashMap<String, String>,
    default: Alignment,
) -> Result<Alignment> {
    match get(key, dotenv) {
        Some(v) if !v.trim().is_empty() => v.parse().with_context(|| format!("invalid {key}")),
        _ => Ok(default),
    }
}

fn document_style(dotenv: &HashMap<String, String>) -> Result<DocumentStyle> {
    let d = DocumentStyle::default();
    Ok(DocumentStyle {
        font_family: get_str("DOC_FONT", dotenv, &d.font_family),
        body_size_pt: get_f32("DOC_BODY_PT", dotenv, d.body_size_pt),
        heading_sizes_pt: [
            get_f32("DOC_H1_PT", dotenv, d.heading_sizes_pt[0]),
            get_f32("DOC_H2_PT", dotenv, d.heading_sizes_pt[1]),
            get_f32("DOC_H3_PT", dotenv, d.heading_sizes_pt[2]),
        ],
        heading_align: get_alignment("DOC_HEADING_ALIGN", dotenv, d.heading_align)?,
        body_align: get_alignment("DOC_BODY_ALIGN", dotenv, d.body_align)?,
        paragraph_spacing_pt: get_f32("DOC_SPACING_PT", dotenv, d.paragraph_spacing_pt),
    })
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dotenv = parse_dotenv();
        Self::from_map(&dotenv)
    }

    fn from_map(dotenv: &HashMap<String, String>) -> Result<Self> {
        let llm_backend = get_str("LLM_BACKEND", dotenv, "openai").to_ascii_lowercase();
        let default_base_url = match llm_backend.as_str() {
            "ollama" => "http://localhost:11434",
            _ => "https://api.openai.com/v1",
        };

        Ok(Config {
            web_bind: get_str("WEB_BIND", dotenv, "0.0.0.0"),
            web_port: get_u16("WEB_PORT", dotenv, 3000),
            llm_base_url: get_str("LLM_BASE_URL", dotenv, default_base_url),
            llm_api_key: get_str("LLM_API_KEY", dotenv, ""),
            model: get_str("MODEL", dotenv, "gpt-4o-mini"),
            prompt_set: get_str("PROMPT_SET", dotenv, "collection"),
            llm_backend,
            call_timeout_s: get_u64("CALL_TIMEOUT_S", dotenv, 120).max(1),
            source_bucket: get_str("SOURCE_BUCKET", dotenv, "cases"),
            output_bucket: get_str("OUTPUT_BUCKET", dotenv, "documents"),
            storage_endpoint: get_str("STORAGE_ENDPOINT", dotenv, ""),
            storage_region: get_str("STORAGE_REGION", dotenv, "us-east-1"),
            storage_public_url: get_str("STORAGE_PUBLIC_URL", dotenv, ""),
            database_url: get_str("DATABASE_URL", dotenv, ""),
            cases_table: get_str("CASES_TABLE", dotenv, "cases"),
            log_format: get_str("LOG_FORMAT", dotenv, "pretty"),
            document_style: document_style(dotenv)?,
        })
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_s)
    }
}
