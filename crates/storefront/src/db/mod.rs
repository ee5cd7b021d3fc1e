//! Database operations for the storefront `PostgreSQL` instance.
//!
//! # Tables
//!
//! - `users` - Customer accounts: profile fields, a single embedded address
//!   (four columns written as a unit), phone, avatar path, password hash
//! - `password_reset_otps` - One active reset code per email
//! - `contact_messages` - Contact form submissions
//! - `tower_sessions.session` - Server-side session storage
//!
//! Queries use the runtime sqlx API (no compile-time macros), so the crate
//! builds without a reachable database.
//!
//! # Migrations
//!
//! Stored in `crates/storefront/migrations/` and applied on startup.

pub mod contact;
pub mod otps;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
