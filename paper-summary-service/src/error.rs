use stage_flow::FlowError;
use std::path::PathBuf;
use thiserror::Error;

/// Why raw PDF bytes could not be turned into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("not a readable PDF: {0}")]
    Unreadable(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("PDF has no extractable text in {pages} page(s)")]
    NoText { pages: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Fatal failures of a processing run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("paper {0} not found")]
    RecordNotFound(String),

    #[error("source file missing: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage failure: {0}")]
    Store(StoreError),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => PipelineError::RecordNotFound(id),
            other => PipelineError::Store(other),
        }
    }
}

impl From<PipelineError> for FlowError {
    fn from(err: PipelineError) -> Self {
        FlowError::TaskExecutionFailed(err.to_string())
    }
}
