use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use caseflow_core::types::CaseFileRef;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::AppState;

pub(crate) fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/cases/process", post(process_case))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn blank_field(file: &CaseFileRef) -> Option<&'static str> {
    [
        ("case_id", &file.case_id),
        ("file_path", &file.file_path),
        ("user_id", &file.user_id),
    ]
    .into_iter()
    .find(|(_, v)| v.trim().is_empty())
    .map(|(k, _)| k)
}

async fn process_case(
    State(state): State<Arc<AppState>>,
    Json(file): Json<CaseFileRef>,
) -> (StatusCode, Json<Value>) {
    if let Some(field) = blank_field(&file) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": format!("{field} must not be empty") })),
        );
    }

    info!(case_id = %file.case_id, file_path = %file.file_path, "processing case");
    match state.pipeline.process(&file).await {
        Ok(outcome) => {
            info!(
                case_id = %file.case_id,
                template = ?outcome.template,
                document_path = %outcome.document_path,
                "case processed"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "ok": true,
                    "analysis": outcome.analysis,
                    "document_url": outcome.document_url,
                })),
            )
        },
        Err(e) => {
            error!(case_id = %file.case_id, kind = e.kind(), "case processing failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use caseflow_core::{
        agent::LlmBackend,
        db::CaseStore,
        markup::translate,
        pipeline::{Pipeline, PipelineSettings},
        render::{render_docx, DocumentStyle},
        storage::ObjectStore,
        types::CaseUpdate,
    };
    use tower::ServiceExt;

    use super::*;

    // ── helpers ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct MemStore {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl ObjectStore for MemStore {
        async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
            self.objects
                .lock()
                .unwrap()
                .get(&format!("{bucket}/{path}"))
                .cloned()
                .ok_or_else(|| anyhow!("no such object"))
        }

        async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, _: &str, _: bool) -> Result<()> {
            self.objects.lock().unwrap().insert(format!("{bucket}/{path}"), bytes);
            Ok(())
        }

        fn public_url(&self, bucket: &str, path: &str) -> String {
            format!("mem://{bucket}/{path}")
        }
    }

    struct NoopCases;

    #[async_trait]
    impl CaseStore for NoopCases {
        async fn update_case(&self, _: &str, _: &CaseUpdate) -> Result<()> {
            Ok(())
        }

        async fn record_document(&self, _: &str, _: &str, _: &str) -> Result<()> {
            Ok(())
        }
    }

    struct CannedLlm(Mutex<VecDeque<String>>);

    #[async_trait]
    impl LlmBackend for CannedLlm {
        async fn complete(&self, _: &str, _: &str, _: &str) -> Result<String> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow!("no reply scripted"))
        }
    }

    fn app(store: MemStore, replies: &[&str]) -> Router {
        let llm = CannedLlm(Mutex::new(replies.iter().map(|r| r.to_string()).collect()));
        let pipeline = Pipeline::new(
            Arc::new(store),
            Arc::new(NoopCases),
            Arc::new(llm),
            Arc::new(caseflow_domains::get_prompt_set("collection").unwrap()),
            PipelineSettings {
                model: "test-model".into(),
                source_bucket: "cases".into(),
                output_bucket: "documents".into(),
                call_timeout: Duration::from_secs(5),
                document_style: DocumentStyle::default(),
            },
        );
        router(Arc::new(AppState { pipeline }))
    }

    fn store_with_case(path: &str) -> MemStore {
        let docx = render_docx(
            &translate("RESOLUTION 44 of 2021\n\nDebtor: ACME S.A.S. owes 1.000.000"),
            &DocumentStyle::default(),
        )
        .unwrap();
        let store = MemStore::default();
        store
            .objects
            .lock()
            .unwrap()
            .insert(format!("cases/{path}"), docx);
        store
    }

    async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/cases/process")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // ── tests ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let response = app(MemStore::default(), &[]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_process_success_returns_analysis_and_url() {
        let app = app(
            store_with_case("u1/c1/resolution.docx"),
            &[
                r#"{"debtor_name": "ACME S.A.S.", "status_flag": "GREEN", "title_type": "resolution"}"#,
                "# PAYMENT ORDER\n\nThe debtor **ACME S.A.S.** shall pay.",
            ],
        );
        let (status, body) = post_json(
            app,
            json!({"case_id": "c1", "file_path": "u1/c1/resolution.docx", "user_id": "u1"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["analysis"]["debtor_name"], "ACME S.A.S.");
        assert_eq!(body["analysis"]["status_flag"], "GREEN");
        assert_eq!(body["document_url"], "mem://documents/u1/c1/payment_order_c1.docx");
    }

    #[tokio::test]
    async fn test_process_failure_is_500_with_error() {
        let (status, body) = post_json(
            app(MemStore::default(), &[]),
            json!({"case_id": "c2", "file_path": "u1/c2/scan.tiff", "user_id": "u1"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("scan.tiff"));
    }

    #[tokio::test]
    async fn test_blank_field_is_rejected() {
        let (status, body) = post_json(
            app(MemStore::default(), &[]),
            json!({"case_id": " ", "file_path": "a.pdf", "user_id": "u1"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "case_id must not be empty");
    }
}
