//! The processing stages of a paper, run in order by the workflow graph.

pub mod extract_text;
pub mod parse_structure;
pub mod render_document;
pub mod start_processing;
pub mod summarize;

pub use extract_text::ExtractTextTask;
pub use parse_structure::ParseStructureTask;
pub use render_document::RenderDocumentTask;
pub use start_processing::StartProcessingTask;
pub use summarize::SummarizeTask;

use tracing::debug;

use crate::error::PipelineError;
use crate::models::PaperUpdate;
use crate::store::PaperStore;

pub mod session_keys {
    pub const PAPER_ID: &str = "paper_id";
    pub const PAPER: &str = "paper";
    pub const EXTRACTED_TEXT: &str = "extracted_text";
    pub const STRUCTURE: &str = "structure";
    pub const SUMMARY: &str = "summary";
}

/// Progress values written at stage boundaries, in the order they are reached.
pub mod checkpoints {
    pub const STARTED: u8 = 10;
    pub const EXTRACTING: u8 = 30;
    pub const EXTRACTED: u8 = 50;
    pub const PARSED: u8 = 70;
    pub const SUMMARIZED: u8 = 85;
    pub const COMPLETED: u8 = 100;
}

async fn checkpoint(
    store: &dyn PaperStore,
    paper_id: &str,
    progress: u8,
) -> Result<(), PipelineError> {
    store
        .update_paper(paper_id, &PaperUpdate::progress(progress))
        .await?;
    debug!(paper_id, progress, "checkpoint reached");
    Ok(())
}
