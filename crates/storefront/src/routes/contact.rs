//! Contact form route handlers.
//!
//! Stores submitted messages in the database for the team to pick up.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bakehouse_core::Email;

use crate::db::contact::ContactRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Contact form data; every field is required.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

/// Submit a contact message.
///
/// POST /api/contact/contact-us
#[instrument(skip(state, user, form), fields(email = %form.email))]
pub async fn contact_us(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Json(form): Json<ContactForm>,
) -> Result<Json<ContactResponse>> {
    let name = form.name.trim();
    let message = form.message.trim();
    if name.is_empty() || message.is_empty() {
        return Err(AppError::BadRequest(
            "Name, email and message are all required".to_owned(),
        ));
    }

    let email =
        Email::parse(form.email.trim()).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let repo = ContactRepository::new(state.pool());
    let id = repo.insert(name, email.as_str(), message).await?;

    match user {
        Some(user) => {
            tracing::info!(message_id = %id, user_id = %user.id, "contact message stored");
        }
        None => tracing::info!(message_id = %id, "contact message stored"),
    }

    Ok(Json(ContactResponse {
        success: true,
        message: "Message sent successfully".to_owned(),
    }))
}
