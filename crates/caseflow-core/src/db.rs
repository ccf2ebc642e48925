use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::{Pool, Runtime};
use tokio_postgres::{types::ToSql, NoTls};

use crate::types::CaseUpdate;

/// Case rows written by the pipeline.
#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn update_case(&self, case_id: &str, update: &CaseUpdate) -> Result<()>;

    /// Attach the generated document to the case.
    async fn record_document(&self, case_id: &str, path: &str, url: &str) -> Result<()>;
}

/// `CaseStore` backed by a PostgreSQL table.
///
/// Expects `id`, `title_type`, `status_flag`, `remarks`, `document_path`,
/// `document_url` and `document_generated_at` (timestamptz) columns. `id` is
/// compared as text so uuid and integer keys both work.
pub struct PgCaseStore {
    pool: Pool,
    table: String,
}

fn validate_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.split('.').count() <= 2
        && name
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    if !valid {
        bail!("invalid table name: {name:?}");
    }
    Ok(())
}

impl PgCaseStore {
    pub fn connect(database_url: &str, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_table_name(&table)?;

        let mut cfg = deadpool_postgres::Config::new();
        cfg.url = Some(database_url.to_string());
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .context("failed to create postgres pool")?;
        Ok(Self { pool, table })
    }

    async fn execute_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        case_id: &str,
    ) -> Result<()> {
        let client = self.pool.get().await.context("failed to get db connection")?;
        let rows = client
            .execute(sql, params)
            .await
            .with_context(|| format!("update of case {case_id} failed"))?;
        if rows == 0 {
            bail!("case {case_id} not found in {}", self.table);
        }
        Ok(())
    }
}

#[async_trait]
impl CaseStore for PgCaseStore {
    async fn update_case(&self, case_id: &str, update: &CaseUpdate) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET title_type = $1, status_flag = $2, remarks = $3 WHERE id::text = $4",
            self.table
        );
        self.execute_one(
            &sql,
            &[&update.title_type, &update.status_flag, &update.remarks, &case_id],
            case_id,
        )
        .await
    }

    async fn record_document(&self, case_id: &str, path: &str, url: &str) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET document_path = $1, document_url = $2, document_generated_at = $3 \
             WHERE id::text = $4",
            self.table
        );
        let now = Utc::now();
        self.execute_one(&sql, &[&path, &url, &now, &case_id], case_id).await
    }
}
