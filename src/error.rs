use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::cache::CacheError;
use crate::pipeline::PipelineError;
use crate::proxy::ProxyError;

/// Errors surfaced to HTTP clients as `{success: false, error}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Upstream(String),

    /// Proxy fetch failure; the client only sees a generic message.
    #[error("Error fetching audio file")]
    AudioFetch(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) | AppError::AudioFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Upstream(msg) => tracing::error!("Upstream error: {msg}"),
            AppError::AudioFetch(detail) => tracing::error!("Proxy audio error: {detail}"),
            AppError::Validation(msg) => tracing::warn!("Bad request: {msg}"),
            AppError::NotFound(msg) => tracing::warn!("Not found: {msg}"),
        }

        let body = Json(ErrorBody {
            success: false,
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::TextTooLong(_) => AppError::Validation(err.to_string()),
            PipelineError::Tts(_) | PipelineError::Upload(_) => AppError::Upstream(err.to_string()),
        }
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotFound(code) => {
                tracing::debug!("Unknown audio code {code}");
                AppError::NotFound("Audio file not found".to_string())
            }
        }
    }
}

impl From<ProxyError> for AppError {
    fn from(err: ProxyError) -> Self {
        AppError::AudioFetch(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
