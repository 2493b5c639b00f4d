use async_trait::async_trait;
use stage_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::info;

use super::{checkpoints, session_keys};
use crate::error::PipelineError;
use crate::models::PaperUpdate;
use crate::parser;
use crate::store::PaperStore;

/// Recovers title, author and sections, and records the title and author.
pub struct ParseStructureTask {
    store: Arc<dyn PaperStore>,
}

impl ParseStructureTask {
    pub fn new(store: Arc<dyn PaperStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Task for ParseStructureTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let paper_id: String = context.require(session_keys::PAPER_ID).await?;
        let text: String = context.require(session_keys::EXTRACTED_TEXT).await?;

        let structure = parser::parse(&text);
        info!(
            paper_id = %paper_id,
            title = %structure.title,
            author = %structure.author,
            has_abstract = !structure.abstract_text.is_empty(),
            "parsed paper structure"
        );

        self.store
            .update_paper(
                &paper_id,
                &PaperUpdate {
                    original_title: Some(structure.title.clone()),
                    author: Some(structure.author.clone()),
                    processing_progress: Some(checkpoints::PARSED),
                    ..Default::default()
                },
            )
            .await
            .map_err(PipelineError::from)?;

        context.set(session_keys::STRUCTURE, structure).await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some("Paper structure parsed".to_string()),
        ))
    }
}
