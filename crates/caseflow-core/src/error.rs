use thiserror::Error;

/// Terminal failure of a case-processing request. Each variant belongs to one
/// stage of the pipeline; none are retried.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("download failed: {0:#}")]
    DownloadFailed(anyhow::Error),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("text extraction failed: {0:#}")]
    ExtractionFailed(anyhow::Error),

    #[error("LLM provider error: {0}")]
    ProviderError(String),

    #[error("malformed model output: {0}")]
    MalformedModelOutput(String),

    #[error("unrecognized status flag: {0:?}")]
    UnrecognizedStatus(String),

    #[error("persistence failed: {0:#}")]
    PersistenceFailed(anyhow::Error),

    #[error("document rendering failed: {0:#}")]
    RenderFailed(anyhow::Error),

    #[error("upload failed: {0:#}")]
    UploadFailed(anyhow::Error),

    #[error("recording document failed: {0:#}")]
    RecordFailed(anyhow::Error),
}

impl CaseError {
    /// Short machine-readable stage name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DownloadFailed(_) => "download_failed",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::ExtractionFailed(_) => "extraction_failed",
            Self::ProviderError(_) => "provider_error",
            Self::MalformedModelOutput(_) => "malformed_model_output",
            Self::UnrecognizedStatus(_) => "unrecognized_status",
            Self::PersistenceFailed(_) => "persistence_failed",
            Self::RenderFailed(_) => "render_failed",
            Self::UploadFailed(_) => "upload_failed",
            Self::RecordFailed(_) => "record_failed",
        }
    }
}
