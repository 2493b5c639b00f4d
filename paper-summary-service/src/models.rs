use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PLACEHOLDER_TITLE: &str = "Academic Paper";
pub const PLACEHOLDER_AUTHOR: &str = "Unknown Author";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

/// Stored state of one uploaded paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: String,
    pub filename: String,
    pub original_title: Option<String>,
    pub author: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub file_path: String,
    pub file_size: u64,
    pub status: ProcessingStatus,
    pub processing_progress: u8,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl PaperRecord {
    /// A fresh record in the `uploaded` state with progress 0.
    pub fn new(filename: impl Into<String>, file_size: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename: filename.into(),
            original_title: None,
            author: None,
            upload_date: Utc::now(),
            file_path: String::new(),
            file_size,
            status: ProcessingStatus::Uploaded,
            processing_progress: 0,
            error_message: None,
        }
    }

    pub fn apply(&mut self, update: &PaperUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(progress) = update.processing_progress {
            self.processing_progress = progress;
        }
        if let Some(title) = &update.original_title {
            self.original_title = Some(title.clone());
        }
        if let Some(author) = &update.author {
            self.author = Some(author.clone());
        }
        if let Some(message) = &update.error_message {
            self.error_message = Some(message.clone());
        }
    }
}

/// Field-level partial update of a [`PaperRecord`]. `None` leaves a field untouched.
///
/// Serializes to a JSON merge patch containing only the set fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaperUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProcessingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PaperUpdate {
    pub fn progress(progress: u8) -> Self {
        Self {
            processing_progress: Some(progress),
            ..Default::default()
        }
    }

    pub fn status(status: ProcessingStatus, progress: u8) -> Self {
        Self {
            status: Some(status),
            processing_progress: Some(progress),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::status(ProcessingStatus::Failed, 0)
        }
    }
}

/// Typed structure recovered from the raw text of an academic paper.
///
/// Every field is always present: failed heuristics degrade to placeholders
/// or empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperStructure {
    pub title: String,
    pub author: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub introduction: String,
    pub conclusion: String,
    pub full_text: String,
}

impl PaperStructure {
    pub fn placeholder(full_text: impl Into<String>) -> Self {
        Self {
            title: PLACEHOLDER_TITLE.to_string(),
            author: PLACEHOLDER_AUTHOR.to_string(),
            abstract_text: String::new(),
            introduction: String::new(),
            conclusion: String::new(),
            full_text: full_text.into(),
        }
    }

    /// Whitespace-collapsed prefix of the full text, at most `limit` characters.
    pub fn excerpt(&self, limit: usize) -> String {
        crate::parser::normalize_whitespace(&self.full_text)
            .chars()
            .take(limit)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub content: String,
}

impl KeyPoint {
    pub fn new(heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            content: content.into(),
        }
    }
}

/// Plain-language summary of a paper as produced by the summarization capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryContent {
    pub title: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub key_points: Vec<KeyPoint>,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default)]
    pub implications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: String,
    pub paper_id: String,
    #[serde(flatten)]
    pub content: SummaryContent,
    pub created_date: DateTime<Utc>,
}

impl Summary {
    pub fn new(paper_id: impl Into<String>, content: SummaryContent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            paper_id: paper_id.into(),
            content,
            created_date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlDocument {
    pub id: String,
    pub paper_id: String,
    pub html_content: String,
    pub created_date: DateTime<Utc>,
}

impl HtmlDocument {
    pub fn new(paper_id: impl Into<String>, html_content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            paper_id: paper_id.into(),
            html_content,
            created_date: Utc::now(),
        }
    }
}

/// Paper metadata the renderer needs besides the summary itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaperMeta {
    pub author: Option<String>,
    pub upload_date: Option<DateTime<Utc>>,
}

impl From<&PaperRecord> for PaperMeta {
    fn from(record: &PaperRecord) -> Self {
        Self {
            author: record.author.clone(),
            upload_date: Some(record.upload_date),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaperResponse {
    pub id: String,
    pub filename: String,
    pub original_title: Option<String>,
    pub author: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub status: ProcessingStatus,
    pub processing_progress: u8,
}

impl From<PaperRecord> for PaperResponse {
    fn from(record: PaperRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            original_title: record.original_title,
            author: record.author,
            upload_date: record.upload_date,
            status: record.status,
            processing_progress: record.processing_progress,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: ProcessingStatus,
    pub progress: u8,
    pub message: Option<String>,
}
