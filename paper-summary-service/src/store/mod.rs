//! Keyed record storage for papers, summaries and rendered HTML.

mod memory;
mod postgres;

pub use memory::InMemoryPaperStore;
pub use postgres::PostgresPaperStore;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{HtmlDocument, PaperRecord, PaperUpdate, Summary};

/// Trait for storing and retrieving paper records and their artifacts
#[async_trait]
pub trait PaperStore: Send + Sync {
    async fn insert_paper(&self, paper: &PaperRecord) -> StoreResult<()>;

    async fn get_paper(&self, id: &str) -> StoreResult<Option<PaperRecord>>;

    /// Apply a partial update; fails with `StoreError::NotFound` for an unknown id.
    async fn update_paper(&self, id: &str, update: &PaperUpdate) -> StoreResult<()>;

    /// Most recently uploaded papers first.
    async fn list_papers(&self, limit: usize) -> StoreResult<Vec<PaperRecord>>;

    async fn insert_summary(&self, summary: &Summary) -> StoreResult<()>;

    async fn get_summary(&self, paper_id: &str) -> StoreResult<Option<Summary>>;

    async fn insert_html(&self, html: &HtmlDocument) -> StoreResult<()>;

    async fn get_html(&self, paper_id: &str) -> StoreResult<Option<HtmlDocument>>;

    /// Release connections. Called once on shutdown.
    async fn close(&self) {}
}
