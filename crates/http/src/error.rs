//! `{error:{code,message,details?}}` envelope. Grounded on
//! `trace-query-service`'s `ApiError`/`IntoResponse` idiom, extended with a
//! machine-readable `code` and optional `details`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scrapcore_core::Error as CoreError;
use serde_json::{json, Value};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn job_not_found(job_id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "JOB_NOT_FOUND", format!("job '{job_id}' not found"))
    }

    pub fn job_ownership(job_id: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, "JOB_OWNERSHIP_ERROR", format!("job '{job_id}' belongs to another client"))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn rate_limited(retry_after_s: f64) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED", "rate limit exceeded")
            .with_details(json!({ "retry_after_s": retry_after_s }))
    }

    pub fn invalid_scope(required: &str, available: &[String]) -> Self {
        Self::new(StatusCode::FORBIDDEN, "INSUFFICIENT_SCOPE", format!("scope '{required}' required"))
            .with_details(json!({ "required_scope": required, "available_scopes": available }))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR", message)
    }

    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }

    pub(crate) fn code(&self) -> &'static str {
        self.code
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NotFound(m) => ApiError::not_found(m),
            CoreError::Conflict(m) => ApiError::conflict(m),
            CoreError::Invalid(m) => ApiError::bad_request(m),
            CoreError::Other(e) => {
                tracing::error!(error = %e, "unhandled store/core error");
                ApiError::database("internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message,
                "details": self.details,
            }
        }));
        (self.status, body).into_response()
    }
}
