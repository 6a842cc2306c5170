//! OTP challenges
//!
//! One challenge is active per deal and signer role. Codes are never stored: a
//! challenge keeps a SHA-256 digest bound to its deal and role, so a code issued for
//! one deal cannot verify another.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::signatures::SignerRole;

/// Lifetime of a challenge unless configured otherwise.
pub const DEFAULT_OTP_TTL: SignedDuration = SignedDuration::from_mins(10);

/// Number of digits in a code.
pub const OTP_CODE_LENGTH: usize = 6;

/// Errors verifying a code. All are recoverable by requesting a new code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OtpError {
    /// Nothing was issued for this deal and role, or it was replaced.
    #[error("no active code for this deal and signer")]
    NoActiveChallenge,

    #[error("code has expired")]
    Expired,

    #[error("code does not match")]
    Mismatch,

    /// The submitted code is not six digits.
    #[error("code must be {OTP_CODE_LENGTH} digits")]
    InvalidFormat,
}

/// A successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpOutcome {
    /// The code was consumed by this call; signing side effects should run.
    Verified,

    /// The code had already been consumed. Nothing further should happen.
    AlreadyVerified,
}

/// An issued code for one deal and signer role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub signer_role: SignerRole,
    /// Hex SHA-256 of the code. The code itself is never stored.
    pub code_hash: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    /// Set once the matching code was submitted.
    pub consumed_at: Option<Timestamp>,
    /// Set when a newer challenge replaced this one.
    pub invalidated_at: Option<Timestamp>,
}

impl OtpChallenge {
    /// Build a fresh challenge for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::InvalidFormat`] when `code` is not six digits.
    pub fn issue(
        id: Uuid,
        deal_id: Uuid,
        signer_role: SignerRole,
        code: &str,
        now: Timestamp,
        ttl: SignedDuration,
    ) -> Result<Self, OtpError> {
        let code = normalize_code(code)?;

        Ok(Self {
            id,
            deal_id,
            signer_role,
            code_hash: hash_code(deal_id, signer_role, code),
            issued_at: now,
            expires_at: now.saturating_add(ttl).unwrap_or(now),
            consumed_at: None,
            invalidated_at: None,
        })
    }

    /// Whether this challenge can still be consumed.
    pub fn is_active(&self) -> bool {
        self.consumed_at.is_none() && self.invalidated_at.is_none()
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    fn matches(&self, code: &str) -> bool {
        constant_time_eq(
            self.code_hash.as_bytes(),
            hash_code(self.deal_id, self.signer_role, code).as_bytes(),
        )
    }
}

/// Check a submitted code against the latest challenge for its deal and role.
///
/// `latest` is the most recent challenge that has not been replaced. A consumed
/// challenge with a matching code is an idempotent success; it is never re-armed.
///
/// # Errors
///
/// Returns an [`OtpError`] for a malformed, mismatched or expired code, or when no
/// challenge exists.
pub fn check_code(
    latest: Option<&OtpChallenge>,
    code: &str,
    now: Timestamp,
) -> Result<OtpOutcome, OtpError> {
    let code = normalize_code(code)?;

    let challenge = latest
        .filter(|challenge| challenge.invalidated_at.is_none())
        .ok_or(OtpError::NoActiveChallenge)?;

    if challenge.consumed_at.is_some() {
        return if challenge.matches(code) {
            Ok(OtpOutcome::AlreadyVerified)
        } else {
            Err(OtpError::NoActiveChallenge)
        };
    }

    if challenge.is_expired(now) {
        return Err(OtpError::Expired);
    }

    if challenge.matches(code) {
        Ok(OtpOutcome::Verified)
    } else {
        Err(OtpError::Mismatch)
    }
}

/// Digest stored in place of a code.
pub fn hash_code(deal_id: Uuid, signer_role: SignerRole, code: &str) -> String {
    format!(
        "{:x}",
        Sha256::digest(format!("{deal_id}:{}:{code}", signer_role.as_str()).as_bytes())
    )
}

/// Trim a submitted code and check it is exactly six ASCII digits.
///
/// # Errors
///
/// Returns [`OtpError::InvalidFormat`] otherwise.
pub fn normalize_code(code: &str) -> Result<&str, OtpError> {
    let code = code.trim();

    if code.len() == OTP_CODE_LENGTH && code.bytes().all(|byte| byte.is_ascii_digit()) {
        Ok(code)
    } else {
        Err(OtpError::InvalidFormat)
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.iter()
        .zip(right)
        .fold(0_u8, |diff, (l, r)| diff | (l ^ r))
        == 0
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn now() -> TestResult<Timestamp> {
        Ok("2025-03-10T12:00:00Z".parse()?)
    }

    fn challenge(now: Timestamp) -> TestResult<OtpChallenge> {
        Ok(OtpChallenge::issue(
            Uuid::from_u128(1),
            Uuid::from_u128(2),
            SignerRole::Brand,
            "482913",
            now,
            DEFAULT_OTP_TTL,
        )?)
    }

    #[test]
    fn issue_hashes_code_and_sets_expiry() -> TestResult {
        let now = now()?;
        let challenge = challenge(now)?;

        assert_ne!(challenge.code_hash, "482913");
        assert_eq!(challenge.code_hash.len(), 64);
        assert_eq!(challenge.expires_at, "2025-03-10T12:10:00Z".parse()?);
        assert!(challenge.is_active());

        Ok(())
    }

    #[test]
    fn matching_code_verifies() -> TestResult {
        let now = now()?;
        let challenge = challenge(now)?;

        assert_eq!(
            check_code(Some(&challenge), " 482913 ", now),
            Ok(OtpOutcome::Verified)
        );

        Ok(())
    }

    #[test]
    fn wrong_code_is_a_mismatch() -> TestResult {
        let now = now()?;
        let challenge = challenge(now)?;

        assert_eq!(
            check_code(Some(&challenge), "000000", now),
            Err(OtpError::Mismatch)
        );

        Ok(())
    }

    #[test]
    fn expired_code_is_rejected() -> TestResult {
        let now = now()?;
        let challenge = challenge(now)?;
        let later = challenge.expires_at;

        assert_eq!(
            check_code(Some(&challenge), "482913", later),
            Err(OtpError::Expired)
        );

        Ok(())
    }

    #[test]
    fn consumed_code_reverifies_idempotently() -> TestResult {
        let now = now()?;
        let consumed = OtpChallenge {
            consumed_at: Some(now),
            ..challenge(now)?
        };

        assert_eq!(
            check_code(Some(&consumed), "482913", now),
            Ok(OtpOutcome::AlreadyVerified)
        );
        assert_eq!(
            check_code(Some(&consumed), "111111", now),
            Err(OtpError::NoActiveChallenge)
        );

        Ok(())
    }

    #[test]
    fn replaced_or_missing_challenge_is_rejected() -> TestResult {
        let now = now()?;
        let replaced = OtpChallenge {
            invalidated_at: Some(now),
            ..challenge(now)?
        };

        assert_eq!(
            check_code(Some(&replaced), "482913", now),
            Err(OtpError::NoActiveChallenge)
        );
        assert_eq!(
            check_code(None, "482913", now),
            Err(OtpError::NoActiveChallenge)
        );

        Ok(())
    }

    #[test]
    fn code_is_bound_to_deal_and_role() {
        let deal = Uuid::from_u128(2);

        assert_ne!(
            hash_code(deal, SignerRole::Brand, "482913"),
            hash_code(deal, SignerRole::Creator, "482913")
        );
        assert_ne!(
            hash_code(deal, SignerRole::Brand, "482913"),
            hash_code(Uuid::from_u128(3), SignerRole::Brand, "482913")
        );
    }

    #[test]
    fn malformed_codes_are_rejected() {
        for code in ["", "12345", "1234567", "12a456", "１２３４５６"] {
            assert_eq!(normalize_code(code), Err(OtpError::InvalidFormat), "{code:?}");
        }
    }
}
