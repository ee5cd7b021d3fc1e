//! Password-reset flow error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during the password-reset handshake.
#[derive(Debug, Error)]
pub enum OtpError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bakehouse_core::EmailError),

    /// No matching admin account for the email.
    #[error("user not found")]
    UserNotFound,

    /// Code is wrong, expired, or was never issued.
    #[error("invalid or expired OTP")]
    InvalidOtp,

    /// Reset attempted without a verified code.
    #[error("OTP has not been verified")]
    InvalidState,

    /// Replacement password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
