use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::Confirmation;
use crate::ApiResponse;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Success response carrying an operator message
pub fn message_response<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::with_message(data, message)),
    )
        .into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    (
        StatusCode::CREATED,
        Json(ApiResponse::with_message(data, message)),
    )
        .into_response()
}

/// Pagination parameters for list operations. Missing values fall back to
/// the configured defaults.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// `?confirm=true` on destructive endpoints. Anything else is a decline.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmParams {
    #[serde(default)]
    pub confirm: bool,
}

impl ConfirmParams {
    pub fn confirmation(&self) -> Confirmation {
        Confirmation::from(self.confirm)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}
