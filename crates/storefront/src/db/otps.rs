//! Repository for password-reset one-time codes.
//!
//! The table is keyed by email, so there is at most one active record per
//! address; issuing a new code overwrites the prior one via upsert.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::otp::OtpRecord;

/// Repository for OTP database operations.
pub struct OtpRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OtpRepository<'a> {
    /// Create a new OTP repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a freshly issued record, discarding any prior one for the email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, record: &OtpRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO password_reset_otps (email, code, verified, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (email) DO UPDATE \
             SET code = EXCLUDED.code, \
                 verified = EXCLUDED.verified, \
                 expires_at = EXCLUDED.expires_at, \
                 created_at = EXCLUDED.created_at",
        )
        .bind(&record.email)
        .bind(&record.code)
        .bind(record.verified)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the active record for an email, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, email: &str) -> Result<Option<OtpRecord>, RepositoryError> {
        let record = sqlx::query_as::<_, OtpRecord>(
            "SELECT email, code, verified, expires_at, created_at \
             FROM password_reset_otps WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Mark the record for an email as verified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no record exists.
    pub async fn mark_verified(&self, email: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE password_reset_otps SET verified = TRUE WHERE email = $1")
            .bind(email)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete the record for an email (consuming it, or discarding an expired one).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, email: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM password_reset_otps WHERE email = $1")
            .bind(email)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
