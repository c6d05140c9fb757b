use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Error;

pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

/// Paginated response for list endpoints. `total` is the size of the full
/// matching set, not the window.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

/// API error that converts to a proper HTTP response
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

/// The single error-kind-to-status table. Internal layers return typed
/// errors; HTTP semantics enter the picture here and nowhere else.
impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound => Self::not_found("Not found"),
            Error::Conflict(message) => Self::conflict(message),
            Error::PermissionDenied(message) => Self::forbidden(message),
            Error::InvalidArgument(message) => Self::bad_request(message),
            Error::Unauthorized => Self {
                status: StatusCode::UNAUTHORIZED,
                message: "Unauthorized".to_string(),
            },
            Error::UpstreamUnavailable => Self {
                status: StatusCode::BAD_GATEWAY,
                message: "Upstream extension unavailable".to_string(),
            },
            Error::UpstreamTimeout => Self {
                status: StatusCode::GATEWAY_TIMEOUT,
                message: "Upstream extension timed out".to_string(),
            },
            other => {
                // The caller gets a generic message; the detail stays in the log.
                tracing::error!("internal error: {}", other);
                Self::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
