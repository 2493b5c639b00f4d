use async_trait::async_trait;
use stage_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::{info, warn};

use super::{checkpoint, checkpoints, session_keys};
use crate::error::PipelineError;
use crate::models::{PaperStructure, Summary};
use crate::store::PaperStore;
use crate::summarizer::{SummaryOutcome, Summarizer};

/// Produces the plain-language summary and stores it.
pub struct SummarizeTask {
    store: Arc<dyn PaperStore>,
    summarizer: Arc<dyn Summarizer>,
}

impl SummarizeTask {
    pub fn new(store: Arc<dyn PaperStore>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self { store, summarizer }
    }
}

#[async_trait]
impl Task for SummarizeTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let paper_id: String = context.require(session_keys::PAPER_ID).await?;
        let structure: PaperStructure = context.require(session_keys::STRUCTURE).await?;

        let outcome = self.summarizer.summarize(&structure).await;
        let status_message = match &outcome {
            SummaryOutcome::Generated(_) => {
                info!(paper_id = %paper_id, "summary generated");
                "Summary generated"
            }
            SummaryOutcome::Degraded { reason, .. } => {
                warn!(paper_id = %paper_id, reason = %reason, "using template summary");
                "Template summary used"
            }
        };

        let content = outcome.into_content();
        self.store
            .insert_summary(&Summary::new(&paper_id, content.clone()))
            .await
            .map_err(PipelineError::from)?;
        checkpoint(self.store.as_ref(), &paper_id, checkpoints::SUMMARIZED).await?;

        context.set(session_keys::SUMMARY, content).await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some(status_message.to_string()),
        ))
    }
}
