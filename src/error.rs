//! Request-level errors and their HTTP mapping.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::gemini::GenerationError;
use crate::knowledge::LoadError;
use crate::pdf::ExtractionError;
use crate::prompt::PromptTooLarge;
use crate::upload::UploadError;

/// Failures in the document pipeline (everything after request validation).
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("failed to extract process text: {0}")]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    PromptTooLarge(#[from] PromptTooLarge),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("extraction worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Errors returned by the handlers, rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Método não permitido")]
    MethodNotAllowed,
    #[error("Nenhum prompt fornecido.")]
    MissingPrompt,
    #[error("Nenhum arquivo PDF enviado.")]
    MissingFile,
    /// Plain-prompt generation failed; the cause is logged, not returned.
    #[error("Falha ao gerar resposta.")]
    Generation(#[source] GenerationError),
    #[error("Falha ao gerar o documento: {0}")]
    Document(#[from] DocumentError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MissingPrompt | AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::Document(DocumentError::PromptTooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Generation(_) | AppError::Document(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Generation(e) => error!("Gemini call failed: {}", e),
            AppError::Document(e) => error!("Document generation failed: {}", e),
            _ => {}
        }

        let body = Json(json!({ "error": self.to_string() }));
        match self {
            AppError::MethodNotAllowed => (status, [(header::ALLOW, "POST")], body).into_response(),
            _ => (status, body).into_response(),
        }
    }
}
