//! User repository for database operations.
//!
//! The address invariant (fully absent or fully populated) is enforced here:
//! the four address columns are always written in a single statement, and a
//! row with a partial address is reported as data corruption.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use bakehouse_core::{Email, UserId};

use super::RepositoryError;
use crate::models::user::{Address, User};

/// Column list shared by every query that materializes a [`User`].
const USER_COLUMNS: &str = "id, name, email, username, phone, \
     address_street, address_city, address_state, address_pincode, \
     avatar_path, password_hash, is_admin, created_at, updated_at";

/// Raw database row for a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    username: String,
    phone: Option<String>,
    address_street: Option<String>,
    address_city: Option<String>,
    address_state: Option<String>,
    address_pincode: Option<String>,
    avatar_path: Option<String>,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<(User, String), RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let address = match (
            self.address_street,
            self.address_city,
            self.address_state,
            self.address_pincode,
        ) {
            (Some(street), Some(city), Some(state), Some(pincode)) => Some(Address {
                street,
                city,
                state,
                pincode,
            }),
            (None, None, None, None) => None,
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "partial address on user {}",
                    self.id
                )));
            }
        };

        let user = User {
            id: UserId::new(self.id),
            name: self.name,
            email,
            username: self.username,
            phone: self.phone,
            address,
            avatar_path: self.avatar_path,
            is_admin: self.is_admin,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        Ok((user, self.password_hash))
    }
}

/// Map a sqlx error, turning unique violations into `Conflict`.
fn map_insert_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email or username already exists".to_owned());
    }
    RepositoryError::Database(e)
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| r.into_user().map(|(user, _)| user)).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| r.into_user().map(|(user, _)| user)).transpose()
    }

    /// Get a user together with their password hash, for login verification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_auth_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        username: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (name, email, username, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(name)
            .bind(email.as_str())
            .bind(username)
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(map_insert_error)?;

        row.into_user().map(|(user, _)| user)
    }

    /// Partially update profile fields; `None` keeps the prior value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email/username is taken.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: Option<&str>,
        email: Option<&Email>,
        username: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE users \
             SET name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 username = COALESCE($4, username), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .bind(name)
            .bind(email.map(Email::as_str))
            .bind(username)
            .fetch_optional(self.pool)
            .await
            .map_err(map_insert_error)?;

        match row {
            Some(r) => r.into_user().map(|(user, _)| user),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Write the full embedded address (all four columns as a unit).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_address(&self, id: UserId, address: &Address) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users \
             SET address_street = $2, address_city = $3, \
                 address_state = $4, address_pincode = $5, \
                 updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.pincode)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Set the phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_phone(&self, id: UserId, phone: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET phone = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_i32())
            .bind(phone)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Set or clear the avatar path.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_avatar_path(
        &self,
        id: UserId,
        path: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET avatar_path = $2, updated_at = now() WHERE id = $1")
                .bind(id.as_i32())
                .bind(path)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Replace the password hash for the account with this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_password_hash_by_email(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE email = $1")
                .bind(email.as_str())
                .bind(password_hash)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete the user row.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was deleted, `false` if it didn't exist
    /// (a second delete is a not-found, never a crash).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
