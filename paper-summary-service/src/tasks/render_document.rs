use async_trait::async_trait;
use stage_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::info;

use super::{checkpoints, session_keys};
use crate::error::PipelineError;
use crate::models::{HtmlDocument, PaperMeta, PaperUpdate, ProcessingStatus, SummaryContent};
use crate::render::render;
use crate::store::PaperStore;

/// Renders the summary to HTML, stores it and completes the paper.
pub struct RenderDocumentTask {
    store: Arc<dyn PaperStore>,
}

impl RenderDocumentTask {
    pub fn new(store: Arc<dyn PaperStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Task for RenderDocumentTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let paper_id: String = context.require(session_keys::PAPER_ID).await?;
        let summary: SummaryContent = context.require(session_keys::SUMMARY).await?;

        // Re-read so the metadata includes the author recorded by the parse stage.
        let paper = self
            .store
            .get_paper(&paper_id)
            .await
            .map_err(PipelineError::from)?
            .ok_or_else(|| PipelineError::RecordNotFound(paper_id.clone()))?;
        let html = render(&summary, &PaperMeta::from(&paper));

        self.store
            .insert_html(&HtmlDocument::new(&paper.id, html))
            .await
            .map_err(PipelineError::from)?;
        self.store
            .update_paper(
                &paper.id,
                &PaperUpdate::status(ProcessingStatus::Completed, checkpoints::COMPLETED),
            )
            .await
            .map_err(PipelineError::from)?;

        info!(paper_id = %paper.id, "paper processing completed");

        Ok(TaskResult::new_with_status(
            None,
            NextAction::End,
            Some("Summary published".to_string()),
        ))
    }
}
