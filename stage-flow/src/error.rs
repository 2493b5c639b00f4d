use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("task execution failed: {0}")]
    TaskExecutionFailed(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("context error: {0}")]
    ContextError(String),

    #[error("graph has no tasks: {0}")]
    GraphNotReady(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
