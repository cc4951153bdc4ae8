//! Domain error taxonomy + Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email not verified")]
    EmailNotVerified,

    #[error("Invalid or expired token")]
    InvalidResetToken,

    // Store, hasher or mail failure. Display stays generic; the inner
    // detail is logged server-side only.
    #[error("Server error, please try again later")]
    Dependency(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_)
            | AuthError::DuplicateEmail
            | AuthError::InvalidResetToken => StatusCode::BAD_REQUEST,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::InvalidCredentials | AuthError::EmailNotVerified => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Dependency(err) = &self {
            error!(error = %err, "request failed on a dependency");
        }
        let status = self.status_code();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            AuthError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::DuplicateEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::NotFound("missing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::EmailNotVerified.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidResetToken.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Dependency(anyhow::anyhow!("db down")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn dependency_message_hides_internal_detail() {
        let err = AuthError::Dependency(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert!(!err.to_string().contains("10.0.0.3"));
    }
}
