use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::auth::errors::AuthError;
use tracing::error;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const INVALID_TOKEN: &str = "Invalid or expired token";
pub const USER_NOT_FOUND: &str = "User not found";
pub const INTERNAL: &str = "Internal server error";

/// HTTP-facing error: a status plus a message that is safe to show clients.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

/// The single error-kind to status table for the auth endpoints.
pub fn status_and_message(e: &AuthError) -> (StatusCode, String) {
    match e {
        AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AuthError::Conflict(field) => (StatusCode::BAD_REQUEST, field.to_string()),
        AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS.into()),
        AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, INVALID_TOKEN.into()),
        AuthError::NotFound => (StatusCode::NOT_FOUND, USER_NOT_FOUND.into()),
        AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.into())
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        if e.is_internal() {
            error!(code = e.code(), error = %e, "internal auth failure");
        }
        let (status, message) = status_and_message(&e);
        Self { status, message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.message}))).into_response()
    }
}
