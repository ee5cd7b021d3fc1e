//! Admin password-reset route handlers.
//!
//! The three-step handshake under `/api/admin`: request a code, verify it,
//! reset the password. These endpoints are deliberately unauthenticated (the
//! caller has lost their password) and sit behind the strict rate limiter.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::services::OtpService;
use crate::state::AppState;

/// Form for requesting a reset code.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Form for verifying a code.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpForm {
    pub email: String,
    pub otp: String,
}

/// Form for setting the replacement password.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub email: String,
    pub password: String,
}

/// Request a password-reset code for an admin account.
///
/// POST /api/admin/forgot-password
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(form): Json<ForgotPasswordForm>,
) -> Result<Json<serde_json::Value>> {
    let service = OtpService::new(state.pool());
    service.request_reset(&form.email).await?;

    Ok(Json(
        serde_json::json!({ "success": true, "message": "OTP sent successfully" }),
    ))
}

/// Verify a submitted reset code.
///
/// POST /api/admin/verify-otp
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(form): Json<VerifyOtpForm>,
) -> Result<Json<serde_json::Value>> {
    let service = OtpService::new(state.pool());
    service.verify(&form.email, form.otp.trim()).await?;

    Ok(Json(
        serde_json::json!({ "success": true, "message": "OTP verified successfully" }),
    ))
}

/// Replace the password after a verified code.
///
/// POST /api/admin/reset-password
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(form): Json<ResetPasswordForm>,
) -> Result<Json<serde_json::Value>> {
    let service = OtpService::new(state.pool());
    service.reset_password(&form.email, &form.password).await?;

    Ok(Json(
        serde_json::json!({ "success": true, "message": "Password reset successfully" }),
    ))
}
