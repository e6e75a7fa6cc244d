use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error response type
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Maps failures to HTTP status codes and renders them as `{"error": ...}`
/// bodies. Persistence failures expose the underlying message to the client.
#[derive(Debug)]
pub enum ApiError {
    /// Path segment is not one of the known categories
    UnknownCategory(String),
    /// Request body could not be read as a create payload
    InvalidPayload { status: StatusCode, message: String },
    /// Store or image write failure during create/list
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::UnknownCategory(slug) => (
                StatusCode::NOT_FOUND,
                format!("Unknown category '{}': expected pizzas, bebidas, sobremesas or saladas", slug),
            ),
            ApiError::InvalidPayload { status, message } => (status, message),
            ApiError::Internal(err) => {
                tracing::error!("Request failed: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", err))
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ApiError::InvalidPayload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<axum::extract::rejection::BytesRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::BytesRejection) -> Self {
        ApiError::InvalidPayload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<axum::extract::rejection::FormRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::FormRejection) -> Self {
        ApiError::InvalidPayload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<axum::extract::multipart::MultipartRejection> for ApiError {
    fn from(rejection: axum::extract::multipart::MultipartRejection) -> Self {
        ApiError::InvalidPayload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::InvalidPayload {
            status: err.status(),
            message: err.body_text(),
        }
    }
}
