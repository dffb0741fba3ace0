//! HTTP-facing error type, mapping [`summary_models::AdapterError`] and
//! queue/store errors onto status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use summary_models::{AdapterError, AdapterErrorKind};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict { reason: String, detail: String },

    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),
}

impl ServiceError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict { .. } => StatusCode::CONFLICT,
            ServiceError::Adapter(err) => match err.kind {
                AdapterErrorKind::InputError => StatusCode::BAD_REQUEST,
                AdapterErrorKind::NoAudio => StatusCode::UNPROCESSABLE_ENTITY,
                AdapterErrorKind::AdapterTransient => StatusCode::BAD_GATEWAY,
                AdapterErrorKind::AdapterFatal => StatusCode::BAD_GATEWAY,
                AdapterErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ServiceError::Conflict { reason, detail } => ErrorBody {
                detail: detail.clone(),
                reason: Some(reason.clone()),
            },
            other => ErrorBody {
                detail: other.to_string(),
                reason: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
