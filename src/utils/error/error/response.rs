//! HTTP response handling for errors

use super::types::WatchError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for WatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            WatchError::NotFound(_) => StatusCode::NOT_FOUND,
            WatchError::AlreadyRunning(_)
            | WatchError::NotRunning(_)
            | WatchError::Terminated(_) => StatusCode::CONFLICT,
            WatchError::Validation(_) | WatchError::Config(_) | WatchError::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            WatchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            WatchError::Delivery(_) | WatchError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let (code, message) = match self {
            WatchError::NotFound(_) => ("NOT_FOUND", self.to_string()),
            WatchError::AlreadyRunning(_) => ("ALREADY_RUNNING", self.to_string()),
            WatchError::NotRunning(_) => ("NOT_RUNNING", self.to_string()),
            WatchError::Terminated(_) => ("TERMINATED", self.to_string()),
            WatchError::Validation(_) => ("VALIDATION_ERROR", self.to_string()),
            WatchError::Config(_) => ("CONFIG_ERROR", self.to_string()),
            WatchError::Serialization(_) => ("PARSING_ERROR", self.to_string()),
            WatchError::Timeout(_) => ("TIMEOUT", self.to_string()),
            WatchError::Delivery(_) | WatchError::HttpClient(_) => {
                ("DELIVERY_ERROR", self.to_string())
            }
            WatchError::Database(_) => ("DATABASE_ERROR", "Database operation failed".to_string()),
            _ => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        let error_response = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

/// Standard error response format
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

/// Error detail carried by [`ErrorResponse`]
#[derive(Debug, serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}
