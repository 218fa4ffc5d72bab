//! Error types for the thesis server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Sadece .docx kabul ediliyor.")]
    UnsupportedFile,

    #[error("Yüklenecek dosya bulunamadı.")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rapor bulunamadı veya süresi doldu.")]
    ReportNotFound,

    #[error("Belge okunamadı: {0}")]
    Document(#[from] shared_docx::DocxError),

    #[error("Rapor oluşturulamadı: {0}")]
    Report(#[from] report_pdf::ReportError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("analysis task failed: {}", err))
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnsupportedFile
            | ServerError::MissingFile
            | ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::ReportNotFound => StatusCode::NOT_FOUND,
            ServerError::Document(_) | ServerError::Report(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            ok: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
