//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use clinicloud_billing::BillingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Validation errors
    #[error("Invalid request: {0}")]
    BadRequest(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,
    #[error("No plan available: {0}")]
    PlanUnavailable(String),

    // Upstream errors
    #[error("Registration rejected: {0}")]
    RegistrationRejected(String),
    #[error("Registration service error")]
    Upstream,

    // Internal errors
    #[error("Internal server error")]
    Internal,
    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Validation
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),

            // Resources
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            ApiError::PlanUnavailable(msg) => (StatusCode::NOT_FOUND, "PLAN_UNAVAILABLE", msg.clone()),

            // Upstream
            ApiError::RegistrationRejected(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "REGISTRATION_REJECTED", msg.clone()),
            ApiError::Upstream => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", self.to_string()),

            // Internal
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", self.to_string()),
            ApiError::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", self.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::PlanNotFound(msg) => ApiError::PlanUnavailable(msg),
            BillingError::Registration { status, message } if status < 500 => {
                tracing::warn!(status = status, "Registration rejected upstream");
                ApiError::RegistrationRejected(message)
            }
            other @ (BillingError::Registration { .. } | BillingError::Http(_)) => {
                tracing::error!("Registration service error: {}", other);
                ApiError::Upstream
            }
            other => {
                tracing::error!("Billing error: {:?}", other);
                ApiError::Internal
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
