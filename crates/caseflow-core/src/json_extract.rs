//! Recovers the JSON object embedded in a free-text model response.
//!
//! Models are asked for bare JSON but routinely wrap it in code fences or add
//! a sentence before or after. Fence markers are dropped, then everything from
//! the first `{` to the last `}` is kept. A response that shows an example
//! object before the real one gets both spanned and fails to parse.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::error::CaseError;

#[allow(clippy::expect_used)]
fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("valid regex"))
}

#[allow(clippy::expect_used)]
fn object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

/// Remove every fenced code-block marker (```` ``` ```` with an optional
/// language tag) from `text`.
pub fn strip_code_fences(text: &str) -> String {
    fence_re().replace_all(text, "").into_owned()
}

/// Extract the single JSON object contained in `raw`.
///
/// Returns the keys that were present. String values are returned verbatim,
/// other scalars in their JSON text form, and `null` values are left out so
/// the record builder treats them as absent.
pub fn extract_json_object(raw: &str) -> Result<BTreeMap<String, String>, CaseError> {
    let unfenced = strip_code_fences(raw);
    let candidate = object_re()
        .find(&unfenced)
        .map(|m| m.as_str().trim())
        .ok_or_else(|| CaseError::MalformedModelOutput("no JSON object found".into()))?;

    let object: serde_json::Map<String, Value> = serde_json::from_str(candidate)
        .map_err(|e| CaseError::MalformedModelOutput(e.to_string()))?;

    Ok(object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}
