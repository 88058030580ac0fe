use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};

use crate::messages;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Operator-facing description
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Inventory error: {0}")]
    InventoryError(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Insufficient payment: {0}")]
    InsufficientPayment(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Concurrent modification of order {0}")]
    ConcurrentModification(i32),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_)
            | Self::InvalidOperation(_)
            | Self::InvalidStatus(_)
            | Self::InventoryError(_) => StatusCode::BAD_REQUEST,
            Self::InternalError(_) | Self::MigrationError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Conflict(_) | Self::ConcurrentModification(_) => StatusCode::CONFLICT,
            Self::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InsufficientPayment(_) => StatusCode::PAYMENT_REQUIRED,
        }
    }

    /// Store-level failures: the store refused or lost the write. Everything
    /// else is a logical failure detected before or during the operation.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_)
                | Self::ConcurrentModification(_)
                | Self::InternalError(_)
                | Self::MigrationError(_)
                | Self::Other(_)
        )
    }

    /// Returns the operator-facing message.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => messages::DATABASE_ERROR.to_string(),
            Self::InternalError(_) | Self::MigrationError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            Self::ConcurrentModification(_) => messages::ORDER_CHANGED_CONCURRENTLY.to_string(),
            Self::NotFound(msg)
            | Self::ValidationError(msg)
            | Self::InvalidOperation(msg)
            | Self::InvalidStatus(msg)
            | Self::InventoryError(msg)
            | Self::InsufficientStock(msg)
            | Self::InsufficientPayment(msg)
            | Self::Conflict(msg) => msg.clone(),
        }
    }

    /// Prefixes logical failures the way the order history screen reports
    /// them. Store failures already carry their own message.
    pub fn into_status_update_failure(self) -> Self {
        match self {
            Self::InvalidStatus(msg) => Self::InvalidStatus(messages::order_status_update_failed(&msg)),
            Self::InventoryError(msg) => {
                Self::InventoryError(messages::order_status_update_failed(&msg))
            }
            Self::NotFound(msg) => Self::NotFound(messages::order_status_update_failed(&msg)),
            other => other,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = self.response_message();

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: error_message,
            details: None,
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

/// Handler-level failures that never reach a service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: None,
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::BadRequest {
            message: "Invalid JSON body".to_string(),
            details: Some(rejection.body_text()),
        }
    }
}

impl From<axum::extract::rejection::PathRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::PathRejection) -> Self {
        Self::BadRequest {
            message: "Invalid path parameter".to_string(),
            details: Some(rejection.body_text()),
        }
    }
}

impl From<axum::extract::rejection::QueryRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::QueryRejection) -> Self {
        Self::BadRequest {
            message: "Invalid query string".to_string(),
            details: Some(rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ServiceError(service_error) => service_error.into_response(),
            ApiError::BadRequest { message, details } => {
                let status = StatusCode::BAD_REQUEST;
                let error_response = ErrorResponse {
                    error: status
                        .canonical_reason()
                        .unwrap_or("Unknown Error")
                        .to_string(),
                    message,
                    details,
                    request_id: current_request_id(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
                (status, Json(error_response)).into_response()
            }
        }
    }
}
