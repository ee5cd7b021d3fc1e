//! Domain models for the storefront.

pub mod otp;
pub mod session;
pub mod user;

pub use otp::{OtpRecord, OtpState};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{Address, User};
