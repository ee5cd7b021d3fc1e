//! Authentication route handlers.
//!
//! Registration, login, and logout. A successful login writes the user into
//! the server-side session; logout flushes the whole session, cart included.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// User payload returned to the frontend (never includes the password hash).
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

/// Register a new account.
///
/// POST /api/auth/register
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<RegisterForm>,
) -> Result<Json<UserResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&form.name, &form.email, &form.username, &form.password)
        .await?;

    login_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

/// Login with email and password.
///
/// POST /api/auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<UserResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&form.email, &form.password).await?;

    // Rotate the session ID on privilege change
    session.cycle_id().await.map_err(session_error)?;
    login_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

/// Logout, destroying the session (and with it the cart).
///
/// POST /api/auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session).await.map_err(session_error)?;
    session.flush().await.map_err(session_error)?;
    clear_sentry_user();

    Ok(Json(
        serde_json::json!({ "success": true, "message": "Logged out" }),
    ))
}

/// Write the logged-in user into the session and Sentry scope.
async fn login_session(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        is_admin: user.is_admin,
    };
    set_current_user(session, &current)
        .await
        .map_err(session_error)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

pub(super) fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session error: {e}"))
}
