//! Admin password-reset service.
//!
//! Drives the three-step handshake: request a code, verify it, then reset
//! the password. Each step is keyed by email; a new request always replaces
//! whatever record came before it.

mod error;

pub use error::OtpError;

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::PgPool;

use bakehouse_core::Email;

use crate::db::otps::OtpRepository;
use crate::db::users::UserRepository;
use crate::models::otp::{OtpRecord, OtpState};
use crate::services::auth::{hash_password, validate_password};

/// Service driving the admin password-reset handshake.
pub struct OtpService<'a> {
    otps: OtpRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> OtpService<'a> {
    /// Create a new OTP service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            otps: OtpRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// Issue a fresh reset code for an admin account.
    ///
    /// Any previously issued code for the email is invalidated, whatever its
    /// state. Mail delivery is not wired up; the code is written to the log
    /// for the operator to relay.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::UserNotFound` if the email does not belong to an
    /// admin account.
    pub async fn request_reset(&self, email: &str) -> Result<(), OtpError> {
        let email = Email::parse(email.trim())?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .filter(|u| u.is_admin)
            .ok_or(OtpError::UserNotFound)?;

        let code = generate_code();
        let record = OtpRecord::issue(email.as_str().to_owned(), code, Utc::now());
        self.otps.upsert(&record).await?;

        tracing::info!(
            user_id = %user.id,
            expires_at = %record.expires_at,
            code = %record.code,
            "issued password reset code"
        );

        Ok(())
    }

    /// Verify a submitted code against the stored record.
    ///
    /// A wrong code leaves the record untouched, so the caller may retry
    /// until expiry. An expired record is deleted on sight. Re-verifying an
    /// already-verified record succeeds, but still only with the right code.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::InvalidOtp` if no code was issued, the code is
    /// wrong, or the code has expired.
    pub async fn verify(&self, email: &str, code: &str) -> Result<(), OtpError> {
        let email = Email::parse(email.trim())?;

        let Some(record) = self.otps.get(email.as_str()).await? else {
            return Err(OtpError::InvalidOtp);
        };

        match verify_decision(&record, code, Utc::now()) {
            VerifyDecision::Discard => {
                self.otps.delete(email.as_str()).await?;
                Err(OtpError::InvalidOtp)
            }
            VerifyDecision::Reject => Err(OtpError::InvalidOtp),
            VerifyDecision::AlreadyVerified => Ok(()),
            VerifyDecision::Accept => {
                self.otps.mark_verified(email.as_str()).await?;
                Ok(())
            }
        }
    }

    /// Replace the account password after a verified code.
    ///
    /// Consumes the record, so a second reset needs a fresh request.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::InvalidState` if no verified, unexpired code exists
    /// for the email.
    pub async fn reset_password(&self, email: &str, new_password: &str) -> Result<(), OtpError> {
        let email = Email::parse(email.trim())?;

        let record = self
            .otps
            .get(email.as_str())
            .await?
            .ok_or(OtpError::InvalidState)?;

        if !record.allows_reset(Utc::now()) {
            return Err(OtpError::InvalidState);
        }

        validate_password(new_password).map_err(|e| match e {
            crate::services::auth::AuthError::WeakPassword(msg) => OtpError::WeakPassword(msg),
            _ => OtpError::PasswordHash,
        })?;
        let password_hash = hash_password(new_password).map_err(|_| OtpError::PasswordHash)?;

        self.users
            .set_password_hash_by_email(&email, &password_hash)
            .await?;
        self.otps.delete(email.as_str()).await?;

        tracing::info!(email = %email, "admin password reset completed");

        Ok(())
    }
}

/// What to do with a submitted code against the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerifyDecision {
    /// Wrong code; the record stays as it is.
    Reject,
    /// Past expiry; the record gets discarded.
    Discard,
    /// Correct code on an issued record; mark it verified.
    Accept,
    /// Correct code on an already-verified record; nothing left to store.
    AlreadyVerified,
}

/// Pure verification decision. The code must match in every non-expired
/// state, so a verified record never acts as a code-free oracle.
fn verify_decision(record: &OtpRecord, code: &str, now: DateTime<Utc>) -> VerifyDecision {
    match record.state(now) {
        OtpState::Expired => VerifyDecision::Discard,
        _ if !record.matches(code) => VerifyDecision::Reject,
        OtpState::Verified => VerifyDecision::AlreadyVerified,
        OtpState::Issued => VerifyDecision::Accept,
    }
}

/// Generate a zero-padded 6-digit code.
fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::otp::{OTP_DIGITS, OTP_TTL_MINUTES};
    use chrono::Duration;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..32 {
            let code = generate_code();
            assert_eq!(code.len(), OTP_DIGITS);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    fn issued(now: DateTime<Utc>) -> OtpRecord {
        OtpRecord::issue("admin@bakehouse.test".to_owned(), "314159".to_owned(), now)
    }

    #[test]
    fn test_issued_record_accepts_only_the_right_code() {
        let now = Utc::now();
        let rec = issued(now);
        assert_eq!(verify_decision(&rec, "314159", now), VerifyDecision::Accept);
        assert_eq!(verify_decision(&rec, "000000", now), VerifyDecision::Reject);
    }

    #[test]
    fn test_verified_record_still_requires_the_code() {
        let now = Utc::now();
        let mut rec = issued(now);
        rec.verified = true;

        assert_eq!(
            verify_decision(&rec, "314159", now),
            VerifyDecision::AlreadyVerified
        );
        // A wrong code must not learn that the record is verified
        assert_eq!(verify_decision(&rec, "999999", now), VerifyDecision::Reject);
    }

    #[test]
    fn test_expired_record_is_discarded_even_with_the_right_code() {
        let now = Utc::now();
        let rec = issued(now);
        let later = now + Duration::minutes(OTP_TTL_MINUTES);
        assert_eq!(
            verify_decision(&rec, "314159", later),
            VerifyDecision::Discard
        );
    }
}
