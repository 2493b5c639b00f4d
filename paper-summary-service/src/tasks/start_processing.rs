use async_trait::async_trait;
use stage_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::info;

use super::{checkpoints, session_keys};
use crate::error::PipelineError;
use crate::models::{PaperUpdate, ProcessingStatus};
use crate::store::PaperStore;

/// Marks the paper as processing and loads its record into the context.
pub struct StartProcessingTask {
    store: Arc<dyn PaperStore>,
}

impl StartProcessingTask {
    pub fn new(store: Arc<dyn PaperStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Task for StartProcessingTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let paper_id: String = context.require(session_keys::PAPER_ID).await?;
        info!(paper_id = %paper_id, "starting paper processing");

        self.store
            .update_paper(
                &paper_id,
                &PaperUpdate::status(ProcessingStatus::Processing, checkpoints::STARTED),
            )
            .await
            .map_err(PipelineError::from)?;

        let paper = self
            .store
            .get_paper(&paper_id)
            .await
            .map_err(PipelineError::from)?
            .ok_or_else(|| PipelineError::RecordNotFound(paper_id.clone()))?;

        context.set(session_keys::PAPER, paper).await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some("Processing started".to_string()),
        ))
    }
}
