use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    agent::LlmBackend,
    config::Config,
    db::CaseStore,
    error::CaseError,
    json_extract::{extract_json_object, strip_code_fences},
    markup::translate,
    render::{render_docx, DocumentStyle, DOCX_CONTENT_TYPE},
    storage::ObjectStore,
    text_extract::{extract_text, FileKind},
    types::{CaseAnalysis, CaseFileRef, CaseUpdate, PromptSet, TemplateKind},
};

/// Where a request currently is. Transitions are strictly linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Downloaded,
    TextExtracted,
    Analyzed,
    Persisted,
    Drafted,
    Rendered,
    Uploaded,
    Recorded,
}

/// Values the pipeline needs from configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub source_bucket: String,
    pub output_bucket: String,
    pub call_timeout: Duration,
    pub document_style: DocumentStyle,
}

impl From<&Config> for PipelineSettings {
    fn from(c: &Config) -> Self {
        Self {
            model: c.model.clone(),
            source_bucket: c.source_bucket.clone(),
            output_bucket: c.output_bucket.clone(),
            call_timeout: c.call_timeout(),
            document_style: c.document_style.clone(),
        }
    }
}

/// Result of one successfully processed case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub analysis: CaseAnalysis,
    pub template: TemplateKind,
    pub document_path: String,
    pub document_url: String,
}

pub struct Pipeline {
    store: Arc<dyn ObjectStore>,
    cases: Arc<dyn CaseStore>,
    llm: Arc<dyn LlmBackend>,
    prompts: Arc<PromptSet>,
    settings: PipelineSettings,
}

async fn bounded<T>(
    limit: Duration,
    what: &str,
    fut: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or_else(|_| Err(anyhow!("{what} timed out after {}s", limit.as_secs())))
}

fn provider_error(e: anyhow::Error) -> CaseError {
    CaseError::ProviderError(format!("{e:#}"))
}

/// Storage path of the generated document for a case.
pub fn document_path(file: &CaseFileRef, kind: TemplateKind) -> String {
    format!(
        "{}/{}/{}_{}.docx",
        file.user_id,
        file.case_id,
        kind.file_stem(),
        file.case_id
    )
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        cases: Arc<dyn CaseStore>,
        llm: Arc<dyn LlmBackend>,
        prompts: Arc<PromptSet>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            cases,
            llm,
            prompts,
            settings,
        }
    }

    fn stage(&self, file: &CaseFileRef, stage: Stage, started: Instant) {
        info!(
            case_id = %file.case_id,
            stage = ?stage,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "case stage complete"
        );
    }

    /// Run one case file through every stage. The first failure ends the
    /// request; earlier stages are not rolled back.
    pub async fn process(&self, file: &CaseFileRef) -> Result<CaseOutcome, CaseError> {
        let started = Instant::now();
        let limit = self.settings.call_timeout;
        let kind = FileKind::from_name(&file.file_path)?;

        let bytes = bounded(
            limit,
            "download",
            self.store.download(&self.settings.source_bucket, &file.file_path),
        )
        .await
        .map_err(CaseError::DownloadFailed)?;
        info!(case_id = %file.case_id, bytes = bytes.len(), "case file downloaded");
        self.stage(file, Stage::Downloaded, started);

        let text = tokio::task::spawn_blocking(move || extract_text(&bytes, kind))
            .await
            .map_err(|e| CaseError::ExtractionFailed(anyhow!("extraction task failed: {e}")))??;
        if text.trim().is_empty() {
            warn!(case_id = %file.case_id, "extracted text is empty");
        }
        info!(case_id = %file.case_id, chars = text.len(), "text extracted");
        self.stage(file, Stage::TextExtracted, started);

        let analysis = self.analyze(file, &text).await?;
        self.stage(file, Stage::Analyzed, started);

        bounded(
            limit,
            "case update",
            self.cases.update_case(&file.case_id, &CaseUpdate::from(&analysis)),
        )
        .await
        .map_err(CaseError::PersistenceFailed)?;
        self.stage(file, Stage::Persisted, started);

        let template = analysis.status()?.template_kind();
        let draft = self.draft(file, &analysis, &text, template).await?;
        self.stage(file, Stage::Drafted, started);

        let style = self.settings.document_style.clone();
        let document = tokio::task::spawn_blocking(move || render_docx(&translate(&draft), &style))
            .await
            .map_err(|e| CaseError::RenderFailed(anyhow!("render task failed: {e}")))?
            .map_err(CaseError::RenderFailed)?;
        self.stage(file, Stage::Rendered, started);

        let bucket = &self.settings.output_bucket;
        let path = document_path(file, template);
        bounded(
            limit,
            "upload",
            self.store.upload(bucket, &path, document, DOCX_CONTENT_TYPE, true),
        )
        .await
        .map_err(CaseError::UploadFailed)?;
        self.stage(file, Stage::Uploaded, started);

        let url = self.store.public_url(bucket, &path);
        bounded(
            limit,
            "document record",
            self.cases.record_document(&file.case_id, &path, &url),
        )
        .await
        .map_err(CaseError::RecordFailed)?;
        self.stage(file, Stage::Recorded, started);

        Ok(CaseOutcome {
            analysis,
            template,
            document_path: path,
            document_url: url,
        })
    }

    async fn analyze(&self, file: &CaseFileRef, text: &str) -> Result<CaseAnalysis, CaseError> {
        let prompt = &self.prompts.analysis;
        let user = prompt.render(&[("case_text", text)]);

        info!(case_id = %file.case_id, model = %self.settings.model, "requesting analysis");
        let raw = bounded(
            self.settings.call_timeout,
            "analysis call",
            self.llm.complete(&prompt.system, &user, &self.settings.model),
        )
        .await
        .map_err(provider_error)?;

        let analysis = match extract_json_object(&raw) {
            Ok(fields) => CaseAnalysis::from_fields(&fields),
            Err(e) => {
                warn!(
                    case_id = %file.case_id,
                    response_len = raw.len(),
                    "analysis response unusable, using fail-safe record: {e}"
                );
                CaseAnalysis::fail_safe()
            },
        };
        info!(case_id = %file.case_id, status_flag = %analysis.status_flag, "case analyzed");
        Ok(analysis)
    }

    async fn draft(
        &self,
        file: &CaseFileRef,
        analysis: &CaseAnalysis,
        text: &str,
        template: TemplateKind,
    ) -> Result<String, CaseError> {
        let prompt = self.prompts.drafting(template);
        let analysis_json = serde_json::to_string_pretty(analysis).unwrap_or_default();
        let user = prompt.render(&[
            ("analysis_json", analysis_json.as_str()),
            ("debtor_name", analysis.debtor_name.as_str()),
            ("issuing_entity", analysis.issuing_entity.as_str()),
            ("total_amount", analysis.total_amount.as_str()),
            ("resolution_date", analysis.resolution_date.as_str()),
            ("enforceability_date", analysis.enforceability_date.as_str()),
            ("title_type", analysis.title_type.as_str()),
            ("status_flag", analysis.status_flag.as_str()),
            ("remarks", analysis.remarks.as_str()),
            ("case_text", text),
        ]);

        info!(case_id = %file.case_id, template = ?template, "requesting draft");
        let raw = bounded(
            self.settings.call_timeout,
            "drafting call",
            self.llm.complete(&prompt.system, &user, &self.settings.model),
        )
        .await
        .map_err(provider_error)?;

        let draft = strip_code_fences(&raw).trim().to_string();
        if draft.is_empty() {
            return Err(CaseError::MalformedModelOutput("empty draft".into()));
        }
        Ok(draft)
    }
}
