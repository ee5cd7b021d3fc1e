//! One-time-code record for the admin password-reset handshake.
//!
//! The handshake per email is `NoRequest -> Issued -> Verified -> Reset`.
//! `NoRequest` is the absence of a row; `Reset` deletes the row again. The
//! decisions in between are pure functions on the record so they can be
//! tested without a database.

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

/// How long an issued code stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Number of digits in a reset code.
pub const OTP_DIGITS: usize = 6;

/// A stored one-time code, keyed by email (one active record per email).
#[derive(Debug, Clone, FromRow)]
pub struct OtpRecord {
    /// Email the code was issued for.
    pub email: String,
    /// The 6-digit code, zero-padded.
    pub code: String,
    /// Set once the code has been verified (the "consumed" marker).
    pub verified: bool,
    /// Instant after which the code is dead regardless of state.
    pub expires_at: DateTime<Utc>,
    /// When the code was issued.
    pub created_at: DateTime<Utc>,
}

/// Observable state of a stored record at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpState {
    /// Code issued, not yet verified.
    Issued,
    /// Code verified; a password reset is now allowed.
    Verified,
    /// Past expiry; only a new request can proceed.
    Expired,
}

impl OtpRecord {
    /// Build a fresh record for `email` with the given code, expiring
    /// [`OTP_TTL_MINUTES`] from `now`.
    #[must_use]
    pub fn issue(email: String, code: String, now: DateTime<Utc>) -> Self {
        Self {
            email,
            code,
            verified: false,
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
            created_at: now,
        }
    }

    /// The record's state at `now`. Expiry wins over the verified flag.
    #[must_use]
    pub fn state(&self, now: DateTime<Utc>) -> OtpState {
        if now >= self.expires_at {
            OtpState::Expired
        } else if self.verified {
            OtpState::Verified
        } else {
            OtpState::Issued
        }
    }

    /// Whether `submitted` exactly matches the stored code.
    #[must_use]
    pub fn matches(&self, submitted: &str) -> bool {
        self.code == submitted
    }

    /// Whether a password reset is allowed at `now`.
    #[must_use]
    pub fn allows_reset(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == OtpState::Verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(now: DateTime<Utc>) -> OtpRecord {
        OtpRecord::issue("admin@bakehouse.test".to_owned(), "042137".to_owned(), now)
    }

    #[test]
    fn test_fresh_record_is_issued() {
        let now = Utc::now();
        assert_eq!(record(now).state(now), OtpState::Issued);
    }

    #[test]
    fn test_matching_is_exact() {
        let now = Utc::now();
        let rec = record(now);
        assert!(rec.matches("042137"));
        // Same number, different padding, is not a match
        assert!(!rec.matches("42137"));
        assert!(!rec.matches("000000"));
    }

    #[test]
    fn test_verified_flag_moves_state() {
        let now = Utc::now();
        let mut rec = record(now);
        assert!(!rec.allows_reset(now));

        rec.verified = true;
        assert_eq!(rec.state(now), OtpState::Verified);
        assert!(rec.allows_reset(now));
    }

    #[test]
    fn test_expiry_wins_over_verified() {
        let now = Utc::now();
        let mut rec = record(now);
        rec.verified = true;

        let later = now + Duration::minutes(OTP_TTL_MINUTES);
        assert_eq!(rec.state(later), OtpState::Expired);
        assert!(!rec.allows_reset(later));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let rec = record(now);
        let just_before = rec.expires_at - Duration::seconds(1);
        assert_eq!(rec.state(just_before), OtpState::Issued);
        assert_eq!(rec.state(rec.expires_at), OtpState::Expired);
    }
}
