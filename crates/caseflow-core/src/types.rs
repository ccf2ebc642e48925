use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use serde::{Deserialize, Serialize};

use crate::error::CaseError;

// ── Case file reference ──────────────────────────────────────────────────

/// Identifies the case file a request operates on. Never inspected for
/// content; only used to compose storage paths and record keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFileRef {
    pub case_id: String,
    pub file_path: String,
    pub user_id: String,
}

// ── Status flag ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusFlag {
    /// Enforceable title.
    Green,
    /// Enforceable, with issues worth flagging.
    Yellow,
    /// Invalid or time-barred.
    Red,
}

impl StatusFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }

    pub fn template_kind(self) -> TemplateKind {
        match self {
            Self::Green | Self::Yellow => TemplateKind::PaymentOrder,
            Self::Red => TemplateKind::LegalDiagnostic,
        }
    }
}

impl fmt::Display for StatusFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFlag {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GREEN" => Ok(Self::Green),
            "YELLOW" => Ok(Self::Yellow),
            "RED" => Ok(Self::Red),
            _ => Err(CaseError::UnrecognizedStatus(s.to_string())),
        }
    }
}

/// Which drafting prompt a case is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    PaymentOrder,
    LegalDiagnostic,
}

impl TemplateKind {
    /// File stem used for the generated document.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::PaymentOrder => "payment_order",
            Self::LegalDiagnostic => "legal_diagnostic",
        }
    }
}

// ── Case analysis record ─────────────────────────────────────────────────

pub const FALLBACK_REMARKS: &str =
    "The model response could not be parsed as a structured analysis; \
     the case was classified RED pending manual review.";

/// Structured classification produced by the analysis call.
///
/// `status_flag` keeps the model's raw (trimmed, upper-cased) value so that an
/// unexpected classification is rejected at drafting time instead of being
/// silently routed to a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseAnalysis {
    pub debtor_name: String,
    pub issuing_entity: String,
    pub total_amount: String,
    pub resolution_date: String,
    pub enforceability_date: String,
    pub title_type: String,
    pub status_flag: String,
    pub remarks: String,
}

impl CaseAnalysis {
    /// Build a record from parsed model fields. Missing fields default to an
    /// empty string; a missing or blank status defaults to `RED`.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        let text = |key: &str| fields.get(key).cloned().unwrap_or_default();
        let status_flag = fields
            .get("status_flag")
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| StatusFlag::Red.as_str().to_string());

        Self {
            debtor_name: text("debtor_name"),
            issuing_entity: text("issuing_entity"),
            total_amount: text("total_amount"),
            resolution_date: text("resolution_date"),
            enforceability_date: text("enforceability_date"),
            title_type: text("title_type"),
            status_flag,
            remarks: text("remarks"),
        }
    }

    /// Record used when the analysis response held no usable JSON.
    pub fn fail_safe() -> Self {
        Self {
            status_flag: StatusFlag::Red.as_str().to_string(),
            remarks: FALLBACK_REMARKS.to_string(),
            ..Self::from_fields(&BTreeMap::new())
        }
    }

    pub fn status(&self) -> Result<StatusFlag, CaseError> {
        self.status_flag.parse()
    }
}

/// Columns written back to the case row after analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseUpdate {
    pub title_type: String,
    pub status_flag: String,
    pub remarks: String,
}

impl From<&CaseAnalysis> for CaseUpdate {
    fn from(a: &CaseAnalysis) -> Self {
        Self {
            title_type: a.title_type.clone(),
            status_flag: a.status_flag.clone(),
            remarks: a.remarks.clone(),
        }
    }
}

// ── Markup document ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { runs: Vec<Run> },
}

impl Block {
    /// Text content with all markup removed.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Heading { text, .. } => text.clone(),
            Self::Paragraph { runs } => runs.iter().map(|r| r.text.as_str()).collect(),
        }
    }
}

// ── Prompt configuration ─────────────────────────────────────────────────

#[allow(clippy::expect_used)]
fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("valid regex"))
}

/// A system/user prompt pair. `user` may contain `{placeholder}` markers that
/// are substituted when the prompt is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub system: String,
    pub user: String,
}

impl PromptTemplate {
    /// Substitute `{key}` markers in one pass over the template. Substituted
    /// values are never rescanned; unknown markers are left as written.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        placeholder_re()
            .replace_all(&self.user, |caps: &Captures<'_>| {
                let key = &caps[1];
                vars.iter()
                    .find(|(k, _)| *k == key)
                    .map_or_else(|| caps[0].to_string(), |(_, v)| (*v).to_string())
            })
            .into_owned()
    }
}

/// The full set of prompts one deployment runs with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSet {
    pub name: String,
    pub analysis: PromptTemplate,
    pub payment_order: PromptTemplate,
    pub legal_diagnostic: PromptTemplate,
}

impl PromptSet {
    pub fn drafting(&self, kind: TemplateKind) -> &PromptTemplate {
        match kind {
            TemplateKind::PaymentOrder => &self.payment_order,
            TemplateKind::LegalDiagnostic => &self.legal_diagnostic,
        }
    }
}
