use async_trait::async_trait;
use stage_flow::{Context, NextAction, Result, Task, TaskResult};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::{checkpoint, checkpoints, session_keys};
use crate::error::PipelineError;
use crate::extract::extract_text;
use crate::models::PaperRecord;
use crate::store::PaperStore;

/// Reads the uploaded PDF and extracts its text layer.
pub struct ExtractTextTask {
    store: Arc<dyn PaperStore>,
}

impl ExtractTextTask {
    pub fn new(store: Arc<dyn PaperStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Task for ExtractTextTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let paper: PaperRecord = context.require(session_keys::PAPER).await?;

        let path = PathBuf::from(&paper.file_path);
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(PipelineError::from)?;
        if !exists {
            return Err(PipelineError::SourceMissing(path).into());
        }

        checkpoint(self.store.as_ref(), &paper.id, checkpoints::EXTRACTING).await?;

        let bytes = tokio::fs::read(&path).await.map_err(PipelineError::from)?;
        let text = tokio::task::spawn_blocking(move || extract_text(&bytes))
            .await
            .map_err(PipelineError::from)?
            .map_err(PipelineError::from)?;

        info!(paper_id = %paper.id, chars = text.len(), "extracted text from PDF");

        checkpoint(self.store.as_ref(), &paper.id, checkpoints::EXTRACTED).await?;
        context.set(session_keys::EXTRACTED_TEXT, text).await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some("Text extracted".to_string()),
        ))
    }
}
