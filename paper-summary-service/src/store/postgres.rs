use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use tracing::info;

use super::PaperStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{HtmlDocument, PaperRecord, PaperUpdate, Summary};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS papers (
        id TEXT PRIMARY KEY,
        data JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS summaries (
        paper_id TEXT PRIMARY KEY,
        data JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS html_documents (
        paper_id TEXT PRIMARY KEY,
        data JSONB NOT NULL
    )",
];

/// PostgreSQL-backed store keeping each record as one JSONB document.
///
/// Partial updates are JSONB merges, so concurrent writers touching different
/// fields of the same record do not overwrite each other.
pub struct PostgresPaperStore {
    pool: PgPool,
}

impl PostgresPaperStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("Connected to PostgreSQL paper store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl PaperStore for PostgresPaperStore {
    async fn insert_paper(&self, paper: &PaperRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO papers (id, data) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(&paper.id)
        .bind(Json(paper))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_paper(&self, id: &str) -> StoreResult<Option<PaperRecord>> {
        let row: Option<Json<PaperRecord>> =
            sqlx::query_scalar("SELECT data FROM papers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(paper)| paper))
    }

    async fn update_paper(&self, id: &str, update: &PaperUpdate) -> StoreResult<()> {
        let patch = serde_json::to_value(update)?;
        let result = sqlx::query("UPDATE papers SET data = data || $2 WHERE id = $1")
            .bind(id)
            .bind(Json(patch))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_papers(&self, limit: usize) -> StoreResult<Vec<PaperRecord>> {
        let rows: Vec<Json<PaperRecord>> = sqlx::query_scalar(
            "SELECT data FROM papers
             ORDER BY (data->>'upload_date')::timestamptz DESC
             LIMIT $1",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(paper)| paper).collect())
    }

    async fn insert_summary(&self, summary: &Summary) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO summaries (paper_id, data) VALUES ($1, $2)
             ON CONFLICT (paper_id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(&summary.paper_id)
        .bind(Json(summary))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_summary(&self, paper_id: &str) -> StoreResult<Option<Summary>> {
        let row: Option<Json<Summary>> =
            sqlx::query_scalar("SELECT data FROM summaries WHERE paper_id = $1")
                .bind(paper_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(summary)| summary))
    }

    async fn insert_html(&self, html: &HtmlDocument) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO html_documents (paper_id, data) VALUES ($1, $2)
             ON CONFLICT (paper_id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(&html.paper_id)
        .bind(Json(html))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_html(&self, paper_id: &str) -> StoreResult<Option<HtmlDocument>> {
        let row: Option<Json<HtmlDocument>> =
            sqlx::query_scalar("SELECT data FROM html_documents WHERE paper_id = $1")
                .bind(paper_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(html)| html))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
