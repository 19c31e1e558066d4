use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use recipe_core::StoreError;
use serde::Serialize;

pub const NOT_FOUND: &str = "recipe not found";
pub const CONNECTION_FAILED: &str = "database connection failed";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Handler failure rendered as a status code and `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self { status, message: message.into(), details }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, None)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND, None)
    }

    pub fn internal(message: &'static str, details: Option<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, details)
    }

    /// The store could not be opened for this request.
    pub fn connection(err: StoreError) -> Self {
        tracing::error!(error = %err, "recipe store unavailable");
        Self::internal(CONNECTION_FAILED, None)
    }

    /// Map a store outcome; `failure` is the generic message for persistence faults.
    pub fn store(err: StoreError, failure: &'static str) -> Self {
        if err.is_persistence() {
            tracing::error!(error = %err, "{failure}");
            return Self::internal(failure, Some(err.to_string()));
        }
        match err {
            StoreError::Validation(message) => Self::bad_request(message),
            _ => Self::not_found(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid request body", Some(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, details: self.details };
        (self.status, Json(body)).into_response()
    }
}
