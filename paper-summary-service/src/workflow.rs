//! Wires the processing stages into a graph and runs it once per paper in
//! the background.

use stage_flow::{ExecutionStatus, FlowError, Graph, GraphBuilder, Task};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, error, info, info_span};

use crate::error::StoreResult;
use crate::models::{HtmlDocument, PaperRecord, PaperUpdate, ProcessingStatus, Summary};
use crate::store::PaperStore;
use crate::summarizer::Summarizer;
use crate::tasks::{
    ExtractTextTask, ParseStructureTask, RenderDocumentTask, StartProcessingTask, SummarizeTask,
    session_keys,
};

pub const PAPER_WORKFLOW_ID: &str = "paper_processing";

/// Build the linear Start → Extract → Parse → Summarize → Render graph.
pub fn build_paper_workflow(
    store: Arc<dyn PaperStore>,
    summarizer: Arc<dyn Summarizer>,
) -> Graph {
    let start = Arc::new(StartProcessingTask::new(store.clone()));
    let extract = Arc::new(ExtractTextTask::new(store.clone()));
    let parse = Arc::new(ParseStructureTask::new(store.clone()));
    let summarize = Arc::new(SummarizeTask::new(store.clone(), summarizer));
    let render = Arc::new(RenderDocumentTask::new(store));

    GraphBuilder::new(PAPER_WORKFLOW_ID)
        .add_task(start.clone())
        .add_task(extract.clone())
        .add_task(parse.clone())
        .add_task(summarize.clone())
        .add_task(render.clone())
        .add_edge(start.id(), extract.id())
        .add_edge(extract.id(), parse.id())
        .add_edge(parse.id(), summarize.id())
        .add_edge(summarize.id(), render.id())
        .build()
}

/// A background run that can be awaited for its terminal status.
pub struct ProcessingHandle {
    pub paper_id: String,
    handle: JoinHandle<ProcessingStatus>,
}

impl ProcessingHandle {
    pub async fn wait(self) -> ProcessingStatus {
        match self.handle.await {
            Ok(status) => status,
            Err(e) => {
                error!(paper_id = %self.paper_id, error = %e, "processing task aborted");
                ProcessingStatus::Failed
            }
        }
    }
}

/// Runs the paper workflow and exposes the stored results.
#[derive(Clone)]
pub struct PaperProcessor {
    store: Arc<dyn PaperStore>,
    graph: Arc<Graph>,
    tracker: TaskTracker,
}

impl PaperProcessor {
    pub fn new(store: Arc<dyn PaperStore>, summarizer: Arc<dyn Summarizer>) -> Self {
        let graph = Arc::new(build_paper_workflow(store.clone(), summarizer));
        Self {
            store,
            graph,
            tracker: TaskTracker::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn PaperStore> {
        &self.store
    }

    /// Start processing a paper without waiting for it. Call once per upload.
    pub fn begin_processing(&self, paper_id: &str) -> ProcessingHandle {
        let processor = self.clone();
        let id = paper_id.to_string();
        let handle = self
            .tracker
            .spawn(async move { processor.process(&id).await });

        ProcessingHandle {
            paper_id: paper_id.to_string(),
            handle,
        }
    }

    /// Run the whole workflow for one paper and return its terminal status.
    ///
    /// Any stage error marks the paper `failed` with progress 0.
    pub async fn process(&self, paper_id: &str) -> ProcessingStatus {
        let span = info_span!("process_paper", paper_id = %paper_id);
        async {
            match self.run_workflow(paper_id).await {
                Ok(()) => ProcessingStatus::Completed,
                Err(e) => {
                    let message = failure_message(e);
                    error!(error = %message, "paper processing failed");
                    if let Err(store_err) = self
                        .store
                        .update_paper(paper_id, &PaperUpdate::failed(message))
                        .await
                    {
                        error!(error = %store_err, "could not record processing failure");
                    }
                    ProcessingStatus::Failed
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_workflow(&self, paper_id: &str) -> stage_flow::Result<()> {
        let mut session = self.graph.new_session(paper_id)?;
        session.context.set(session_keys::PAPER_ID, paper_id).await?;

        let result = self.graph.execute_session(&mut session).await?;
        match result.status {
            ExecutionStatus::Completed => {
                info!(
                    status = session.status_message.as_deref().unwrap_or_default(),
                    "workflow finished"
                );
                Ok(())
            }
            ExecutionStatus::Paused => Err(FlowError::TaskExecutionFailed(format!(
                "workflow stopped before completion at {}",
                session.current_task_id
            ))),
        }
    }

    pub async fn record(&self, paper_id: &str) -> StoreResult<Option<PaperRecord>> {
        self.store.get_paper(paper_id).await
    }

    /// The summary, only once the paper has completed.
    pub async fn summary(&self, paper_id: &str) -> StoreResult<Option<Summary>> {
        if !self.is_completed(paper_id).await? {
            return Ok(None);
        }
        self.store.get_summary(paper_id).await
    }

    /// The rendered HTML, only once the paper has completed.
    pub async fn html(&self, paper_id: &str) -> StoreResult<Option<HtmlDocument>> {
        if !self.is_completed(paper_id).await? {
            return Ok(None);
        }
        self.store.get_html(paper_id).await
    }

    async fn is_completed(&self, paper_id: &str) -> StoreResult<bool> {
        Ok(self
            .store
            .get_paper(paper_id)
            .await?
            .is_some_and(|paper| paper.status == ProcessingStatus::Completed))
    }

    /// Stop accepting runs, wait for in-flight ones, then close the store.
    pub async fn shutdown(&self) {
        self.tracker.close();
        info!(in_flight = self.tracker.len(), "waiting for paper processing to finish");
        self.tracker.wait().await;
        self.store.close().await;
    }
}

fn failure_message(err: FlowError) -> String {
    match err {
        FlowError::TaskExecutionFailed(message) => message,
        other => other.to_string(),
    }
}
