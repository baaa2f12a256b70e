//! Mapping of domain failures onto HTTP responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;

/// Error returned by handlers, rendered as `{"error": "<message>"}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert a domain error, naming the missing resource on `NotFound`
pub fn or_not_found(message: &'static str) -> impl FnOnce(DomainError) -> ApiError {
    move |e| match e {
        DomainError::NotFound => ApiError::not_found(message),
        other => ApiError::from(other),
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => Self::not_found(e.to_string()),
            DomainError::Validation(msg) | DomainError::Conflict(msg) => {
                Self::new(StatusCode::BAD_REQUEST, msg)
            }
            DomainError::Database(_) | DomainError::Internal(_) => {
                tracing::error!("Request failed: {}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_become_bad_request() {
        let err = ApiError::from(DomainError::Conflict("duplicate".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "duplicate");

        let err = ApiError::from(DomainError::Validation("no authors".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_takes_the_resource_message() {
        let err = or_not_found("Author not found")(DomainError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Author not found");

        let err = or_not_found("Author not found")(DomainError::Database("locked".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
