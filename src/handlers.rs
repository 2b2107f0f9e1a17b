//! HTTP handlers and router.

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        Request, State,
    },
    http::{header, Method},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, DocumentError};
use crate::gemini::TextGenerator;
use crate::knowledge::load_knowledge_base;
use crate::pdf::TextExtractor;
use crate::prompt::{assemble_prompt, check_prompt_size, DEFAULT_INSTRUCTION};
use crate::upload::{parse_multipart, UploadError};

/// Multipart field carrying the process PDF.
pub const PDF_FIELD: &str = "pdf";
/// Multipart field carrying the optional user instruction.
pub const INSTRUCTION_FIELD: &str = "instrucao";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
    pub extractor: Arc<dyn TextExtractor>,
    pub knowledge_dir: Arc<PathBuf>,
    pub max_prompt_chars: usize,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/gemini", post(generate_text).fallback(method_not_allowed))
        .route("/api/parecer", post(generate_document).fallback(method_not_allowed))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(reject_bare_options))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    text: String,
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Any method other than POST. Nothing is read from the request.
async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// An OPTIONS request to an API route without `Access-Control-Request-Method`
/// is not a CORS preflight and is refused like any other non-POST method.
async fn reject_bare_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS
        && request.uri().path().starts_with("/api/")
        && !request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
    {
        return AppError::MethodNotAllowed.into_response();
    }
    next.run(request).await
}

/// Relay a raw prompt to the generator.
async fn generate_text(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let prompt = match payload {
        Ok(Json(PromptRequest {
            prompt: Some(prompt),
        })) if !prompt.is_empty() => prompt,
        Ok(_) => return Err(AppError::MissingPrompt),
        Err(rejection) => {
            debug!("Rejected prompt body: {}", rejection);
            return Err(AppError::MissingPrompt);
        }
    };

    info!("Received prompt ({} chars)", prompt.chars().count());

    let text = state
        .generator
        .generate(&prompt)
        .await
        .map_err(AppError::Generation)?;

    Ok(Json(GenerationResponse { text }))
}

/// Generate the report, opinion and vote for an uploaded process PDF.
async fn generate_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let request_id = Uuid::new_v4();

    let multipart =
        multipart.map_err(|e| DocumentError::from(UploadError::Rejected(e.body_text())))?;
    let form = parse_multipart(multipart)
        .await
        .map_err(DocumentError::from)?;

    let file = form.file(PDF_FIELD).ok_or(AppError::MissingFile)?;
    if form.files(PDF_FIELD).len() > 1 {
        warn!("[{}] Several files under '{}', using the first", request_id, PDF_FIELD);
    }
    let instruction = form
        .field(INSTRUCTION_FIELD)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_INSTRUCTION)
        .to_string();

    info!(
        "[{}] Received process file: {} ({}, {} bytes, sha256={:x})",
        request_id,
        file.filename,
        file.content_type.as_deref().unwrap_or("unknown type"),
        file.data.len(),
        Sha256::digest(&file.data)
    );

    let prompt = build_prompt(&state, file.data.clone(), instruction).await?;
    check_prompt_size(&prompt, state.max_prompt_chars).map_err(DocumentError::from)?;
    debug!("[{}] Assembled prompt: {} bytes", request_id, prompt.len());

    let text = state
        .generator
        .generate(&prompt)
        .await
        .map_err(DocumentError::from)?;

    info!("[{}] Document generated ({} bytes)", request_id, text.len());
    Ok(Json(GenerationResponse { text }))
}

/// Extract the process, load the knowledge base and assemble the prompt.
///
/// PDF parsing is CPU-bound, so the whole step runs on a blocking worker.
async fn build_prompt(
    state: &AppState,
    process_pdf: Bytes,
    instruction: String,
) -> Result<String, DocumentError> {
    let extractor = Arc::clone(&state.extractor);
    let knowledge_dir = Arc::clone(&state.knowledge_dir);

    tokio::task::spawn_blocking(move || -> Result<String, DocumentError> {
        let process_text = extractor.extract_text(&process_pdf)?;
        let knowledge = load_knowledge_base(&knowledge_dir, extractor.as_ref())?;
        Ok(assemble_prompt(&instruction, &knowledge.text, &process_text))
    })
    .await?
}
