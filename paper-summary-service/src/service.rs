use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::{
    config::Config,
    error::StoreError,
    models::{PaperRecord, PaperResponse, ProcessingStatus, StatusResponse, Summary},
    store::PaperStore,
    workflow::PaperProcessor,
};

const LIST_LIMIT: usize = 100;
/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "paper_id": id
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn store_error(err: StoreError) -> ApiError {
    error!(error = %err, "storage request failed");
    internal_error("Storage failure", &err.to_string())
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PaperStore>,
    pub processor: PaperProcessor,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(processor: PaperProcessor, config: Config) -> Self {
        Self {
            store: processor.store().clone(),
            processor,
            config: Arc::new(config),
        }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    let body_limit = app_state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/papers", get(list_papers))
        .route("/api/papers/upload", post(upload_paper))
        .route("/api/papers/{id}/status", get(get_status))
        .route("/api/papers/{id}/summary", get(get_summary))
        .route("/api/papers/{id}/html", get(get_html))
        .route("/api/papers/{id}/download/{format}", get(download))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Paper Summary Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Turns academic PDFs into plain-language summaries",
        "endpoints": {
            "POST /api/papers/upload": "Upload a PDF (multipart field 'file')",
            "GET /api/papers": "List recent papers",
            "GET /api/papers/{id}/status": "Processing status and progress",
            "GET /api/papers/{id}/summary": "Summary of a completed paper",
            "GET /api/papers/{id}/html": "Rendered summary page",
            "GET /api/papers/{id}/download/{original|summary|html}": "Download an artifact",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn upload_paper(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<PaperResponse> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request_error(&format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(sanitize_filename).unwrap_or_default();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request_error(&format!("Failed to read upload: {e}")))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| bad_request_error("No file provided"))?;
    validate_upload(&filename, bytes.len(), state.config.max_upload_bytes)?;

    let mut paper = PaperRecord::new(filename, bytes.len() as u64);
    let path = state
        .config
        .upload_folder
        .join(format!("{}_{}", paper.id, paper.filename));
    save_upload(&state.config.upload_folder, &path, &bytes).await?;
    paper.file_path = path.to_string_lossy().into_owned();

    state.store.insert_paper(&paper).await.map_err(store_error)?;
    info!(
        paper_id = %paper.id,
        filename = %paper.filename,
        file_size = paper.file_size,
        "paper uploaded"
    );

    state.processor.begin_processing(&paper.id);

    Ok(Json(PaperResponse::from(paper)))
}

fn validate_upload(filename: &str, size: usize, max_bytes: usize) -> Result<(), ApiError> {
    if filename.is_empty() {
        return Err(bad_request_error("No file selected"));
    }
    let is_pdf = FsPath::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(bad_request_error("Only PDF files are allowed"));
    }
    if size == 0 {
        return Err(bad_request_error("File is empty"));
    }
    if size > max_bytes {
        return Err(bad_request_error(&format!(
            "File exceeds the {max_bytes} byte limit"
        )));
    }
    Ok(())
}

/// Last path component with anything outside `[A-Za-z0-9._-]` replaced.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

async fn save_upload(folder: &FsPath, path: &FsPath, bytes: &[u8]) -> Result<(), ApiError> {
    let write = async {
        tokio::fs::create_dir_all(folder).await?;
        tokio::fs::write(path, bytes).await
    };
    write.await.map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to save upload");
        internal_error("Failed to save upload", &e.to_string())
    })
}

async fn list_papers(State(state): State<AppState>) -> ApiResult<Vec<PaperResponse>> {
    let papers = state
        .store
        .list_papers(LIST_LIMIT)
        .await
        .map_err(store_error)?;
    Ok(Json(papers.into_iter().map(PaperResponse::from).collect()))
}

async fn load_paper(state: &AppState, id: &str) -> Result<PaperRecord, ApiError> {
    state
        .processor
        .record(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found_error("Paper not found", id))
}

async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusResponse> {
    let paper = load_paper(&state, &id).await?;
    Ok(Json(StatusResponse {
        status: paper.status,
        progress: paper.processing_progress,
        message: paper.error_message,
    }))
}

async fn load_summary(state: &AppState, id: &str) -> Result<Summary, ApiError> {
    let paper = load_paper(state, id).await?;
    if paper.status != ProcessingStatus::Completed {
        return Err(bad_request_error("Paper processing not completed"));
    }
    state
        .processor
        .summary(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found_error("Summary not found", id))
}

async fn load_html(state: &AppState, id: &str) -> Result<String, ApiError> {
    let paper = load_paper(state, id).await?;
    if paper.status != ProcessingStatus::Completed {
        return Err(bad_request_error("Paper processing not completed"));
    }
    state
        .processor
        .html(id)
        .await
        .map_err(store_error)?
        .map(|document| document.html_content)
        .ok_or_else(|| not_found_error("HTML document not found", id))
}

async fn get_summary(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Summary> {
    load_summary(&state, &id).await.map(Json)
}

async fn get_html(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    load_html(&state, &id).await.map(Html)
}

async fn download(
    State(state): State<AppState>,
    Path((id, format)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (content_type, filename, body) = match format.as_str() {
        "original" => {
            let paper = load_paper(&state, &id).await?;
            let bytes = tokio::fs::read(&paper.file_path).await.map_err(|e| {
                warn!(paper_id = %id, error = %e, "original file unavailable");
                not_found_error("Original file not found", &id)
            })?;
            ("application/pdf", paper.filename, bytes)
        }
        "summary" => {
            let summary = load_summary(&state, &id).await?;
            let body = serde_json::to_vec_pretty(&summary)
                .map_err(|e| internal_error("Failed to encode summary", &e.to_string()))?;
            ("application/json", format!("summary_{id}.json"), body)
        }
        "html" => {
            let html = load_html(&state, &id).await?;
            ("text/html; charset=utf-8", format!("summary_{id}.html"), html.into_bytes())
        }
        _ => return Err(bad_request_error("Invalid format")),
    };

    let disposition = format!("attachment; filename=\"{filename}\"");
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
