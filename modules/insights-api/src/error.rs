use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::warn;

use insights_common::wire::MessageResponse;
use insights_common::DashboardError;

/// Handler error. Every variant renders as `{ success: false, message }`;
/// store failures also carry the underlying message in `error`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Server Error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn record_not_found() -> Self {
        ApiError::NotFound("Record not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Validation(msg) => ApiError::Validation(msg),
            DashboardError::Anyhow(e) => ApiError::Internal(e),
            err @ DashboardError::Config(_) => ApiError::Internal(anyhow::anyhow!(err.to_string())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Internal(e) => {
                warn!(error = %e, "Request failed");
                MessageResponse {
                    success: false,
                    message: self.to_string(),
                    error: Some(format!("{e:#}")),
                }
            }
            _ => MessageResponse {
                success: false,
                message: self.to_string(),
                error: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
