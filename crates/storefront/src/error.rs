//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses carry the `{"success": false, "message": ...}` JSON shape the
//! frontend expects.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::avatar::AvatarError;
use crate::services::otp::OtpError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Password-reset handshake failed.
    #[error("Password reset error: {0}")]
    Otp(#[from] OtpError),

    /// Avatar upload or removal failed.
    #[error("Avatar error: {0}")]
    Avatar(#[from] AvatarError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error should be reported to Sentry.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
            | Self::Otp(OtpError::Repository(_) | OtpError::PasswordHash)
            | Self::Avatar(AvatarError::Io(_)) => true,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Otp(err) => match err {
                OtpError::UserNotFound => StatusCode::NOT_FOUND,
                OtpError::InvalidOtp
                | OtpError::InvalidState
                | OtpError::WeakPassword(_)
                | OtpError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                OtpError::Repository(_) | OtpError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Avatar(err) => match err {
                AvatarError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                AvatarError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email or username already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::MissingField(field) => format!("Missing required field: {field}"),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_string()
                }
            },
            Self::Otp(err) => match err {
                OtpError::UserNotFound => "No admin account found for this email".to_string(),
                OtpError::InvalidOtp => "Invalid or expired OTP".to_string(),
                OtpError::InvalidState => {
                    "OTP not verified, please restart the reset process".to_string()
                }
                OtpError::WeakPassword(msg) => msg.clone(),
                OtpError::InvalidEmail(_) => "Invalid email address".to_string(),
                OtpError::Repository(_) | OtpError::PasswordHash => {
                    "Internal server error".to_string()
                }
            },
            Self::Avatar(err) => match err {
                AvatarError::TooLarge { max } => {
                    format!("File too large (max {} MB)", max / (1024 * 1024))
                }
                AvatarError::Io(_) => "Internal server error".to_string(),
            },
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("user 123".to_string());
        assert_eq!(err.to_string(), "Not found: user 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_status_codes() {
        // A vanished row (e.g. a second delete-account) reports not-found,
        // never an internal error
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "email or username already exists".to_owned()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_otp_error_status_codes() {
        assert_eq!(
            get_status(AppError::Otp(OtpError::InvalidOtp)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Otp(OtpError::InvalidState)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Otp(OtpError::UserNotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_avatar_too_large_status() {
        assert_eq!(
            get_status(AppError::Avatar(AvatarError::TooLarge { max: 2_097_152 })),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
