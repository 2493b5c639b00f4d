use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::PaperStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{HtmlDocument, PaperRecord, PaperUpdate, Summary};

/// In-memory implementation of PaperStore
#[derive(Clone, Default)]
pub struct InMemoryPaperStore {
    papers: Arc<DashMap<String, PaperRecord>>,
    summaries: Arc<DashMap<String, Summary>>,
    html: Arc<DashMap<String, HtmlDocument>>,
}

impl InMemoryPaperStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaperStore for InMemoryPaperStore {
    async fn insert_paper(&self, paper: &PaperRecord) -> StoreResult<()> {
        self.papers.insert(paper.id.clone(), paper.clone());
        Ok(())
    }

    async fn get_paper(&self, id: &str) -> StoreResult<Option<PaperRecord>> {
        Ok(self.papers.get(id).map(|entry| entry.clone()))
    }

    async fn update_paper(&self, id: &str, update: &PaperUpdate) -> StoreResult<()> {
        let mut entry = self
            .papers
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        entry.apply(update);
        Ok(())
    }

    async fn list_papers(&self, limit: usize) -> StoreResult<Vec<PaperRecord>> {
        let mut papers: Vec<PaperRecord> =
            self.papers.iter().map(|entry| entry.value().clone()).collect();
        papers.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        papers.truncate(limit);
        Ok(papers)
    }

    async fn insert_summary(&self, summary: &Summary) -> StoreResult<()> {
        self.summaries
            .insert(summary.paper_id.clone(), summary.clone());
        Ok(())
    }

    async fn get_summary(&self, paper_id: &str) -> StoreResult<Option<Summary>> {
        Ok(self.summaries.get(paper_id).map(|entry| entry.clone()))
    }

    async fn insert_html(&self, html: &HtmlDocument) -> StoreResult<()> {
        self.html.insert(html.paper_id.clone(), html.clone());
        Ok(())
    }

    async fn get_html(&self, paper_id: &str) -> StoreResult<Option<HtmlDocument>> {
        Ok(self.html.get(paper_id).map(|entry| entry.clone()))
    }
}
