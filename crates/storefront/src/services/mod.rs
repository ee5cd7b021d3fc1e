//! Business-logic services sitting between routes and repositories.

pub mod auth;
pub mod avatar;
pub mod otp;

pub use auth::{AuthError, AuthService};
pub use avatar::{AvatarError, AvatarStore};
pub use otp::{OtpError, OtpService};
