//! Repository for contact form submissions.
//!
//! Delivery (mail, notifications) is out of scope; persisting the message is
//! the sink for the contact form.

use sqlx::PgPool;

use bakehouse_core::MessageId;

use super::RepositoryError;

/// Repository for contact message operations.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a submitted message and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<MessageId, RepositoryError> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO contact_messages (name, email, message) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(email)
        .bind(message)
        .fetch_one(self.pool)
        .await?;

        Ok(MessageId::new(id))
    }
}
