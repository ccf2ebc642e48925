mod logging;
mod routes;
mod storage;

use std::sync::Arc;

use anyhow::Context;
use caseflow_core::{
    config::Config,
    db::PgCaseStore,
    pipeline::{Pipeline, PipelineSettings},
};
use tracing::info;

use crate::storage::S3Store;

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    pub pipeline: Pipeline,
}

// ── main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init_tracing(&config.log_format);

    let prompts = caseflow_domains::get_prompt_set(&config.prompt_set)
        .with_context(|| format!("unknown PROMPT_SET: {}", config.prompt_set))?;
    let llm = caseflow_agent::backend_from_config(&config)?;
    info!(
        backend = %config.llm_backend,
        model = %config.model,
        prompt_set = %prompts.name,
        "llm backend ready"
    );

    let store = Arc::new(S3Store::from_config(&config).await);
    let cases = Arc::new(PgCaseStore::connect(&config.database_url, &config.cases_table)?);
    info!(table = %config.cases_table, "case store ready");

    let pipeline = Pipeline::new(
        store,
        cases,
        llm,
        Arc::new(prompts),
        PipelineSettings::from(&config),
    );
    let state = Arc::new(AppState { pipeline });

    let app = routes::router(state);

    let bind = config.web_bind.clone();
    let port = config.web_port;
    let addr = format!("{bind}:{port}");

    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
