// HTTP response utilities: maps dashboard errors onto status codes
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::DashboardError;

/// Error half of every handler's return type
#[derive(Debug)]
pub struct ApiError(pub DashboardError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DashboardError::UnknownCard(_) => StatusCode::NOT_FOUND,
            DashboardError::UnknownType(_)
            | DashboardError::InvalidEventKey { .. }
            | DashboardError::UnroutableEvent(_)
            | DashboardError::UnknownColumn(_) => StatusCode::BAD_REQUEST,
            DashboardError::DuplicateType(_)
            | DashboardError::Render(_)
            | DashboardError::Persistence(_)
            | DashboardError::Io(_)
            | DashboardError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(error: DashboardError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
