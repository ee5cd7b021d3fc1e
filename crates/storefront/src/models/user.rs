//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bakehouse_core::{Email, UserId};

/// A delivery address embedded in the user record.
///
/// Either fully absent or fully populated; a partial address is not a modeled
/// state (the repository writes all four columns as a unit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// A storefront user (domain type).
///
/// Serialized directly into API responses; the password hash never lives on
/// this type.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Login handle.
    pub username: String,
    /// Phone number, if set.
    pub phone: Option<String>,
    /// Single embedded delivery address, if set.
    pub address: Option<Address>,
    /// Filesystem path of the uploaded avatar, if set.
    pub avatar_path: Option<String>,
    /// Whether this account may use the admin password-reset flow.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
