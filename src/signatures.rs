//! Signatures
//!
//! A stored signature row is only advisory. Whether it counts as proof that a
//! specific person signed a specific deal is decided here, from every field of the
//! row plus the viewer's identity, and the answer is a query result rather than an
//! error: "not yet validly signed" is the normal state before OTP verification.

use std::{fmt, str::FromStr};

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;
use uuid::Uuid;

use crate::timestamps::parse_timestamp;

/// Signatures dated at or before this instant (2020-01-01T00:00:00Z) are rejected.
pub const EARLIEST_SIGNATURE: Timestamp = Timestamp::constant(1_577_836_800, 0);

/// How far into the future a signature may be dated before it is rejected.
pub const MAX_CLOCK_SKEW: SignedDuration = SignedDuration::from_secs(60);

/// Which side of the agreement signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerRole {
    /// The content creator. Legacy rows may say `influencer`.
    Creator,
    /// The brand's signatory.
    Brand,
}

impl SignerRole {
    /// Both roles, creator first.
    pub const ALL: [Self; 2] = [Self::Creator, Self::Brand];

    /// Canonical storage value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Brand => "brand",
        }
    }
}

impl fmt::Display for SignerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignerRole {
    type Err = UnknownSignerRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "creator" | "influencer" => Ok(Self::Creator),
            "brand" => Ok(Self::Brand),
            _ => Err(UnknownSignerRole(value.to_string())),
        }
    }
}

/// A role string that is neither creator nor brand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signer role {0:?}")]
pub struct UnknownSignerRole(pub String);

/// A stored signature row. Timestamps are kept as stored text since legacy rows may
/// hold values that do not parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub id: Uuid,
    pub deal_id: Uuid,
    /// `None` when the stored role is not recognised.
    pub signer_role: Option<SignerRole>,
    pub signer_name: Option<String>,
    pub signer_email: Option<String>,
    pub signed: bool,
    /// RFC 3339 or a legacy timestamp format.
    pub signed_at: Option<String>,
    pub otp_verified: bool,
    pub otp_verified_at: Option<String>,
    /// Client address captured at signing. Required.
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// The authenticated viewer, supplied by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    /// Authenticated email, if any.
    pub email: Option<String>,
}

impl SessionContext {
    /// Session for the given email.
    pub fn new(email: Option<&str>) -> Self {
        Self {
            email: email.map(str::to_string),
        }
    }
}

/// Everything a verdict depends on besides the row itself.
#[derive(Debug, Clone, Copy)]
pub struct VerificationContext<'a> {
    /// Deal being viewed.
    pub deal_id: Uuid,

    /// Email the signer is expected to be.
    pub expected_email: Option<&'a str>,

    /// Reference instant for the clock-skew check.
    pub now: Timestamp,
}

impl<'a> VerificationContext<'a> {
    /// Context for the session's own signature on a deal.
    pub fn for_session(deal_id: Uuid, session: &'a SessionContext, now: Timestamp) -> Self {
        Self {
            deal_id,
            expected_email: session.email.as_deref(),
            now,
        }
    }
}

/// Why a signature does not count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// No row exists.
    Missing,
    /// The row's own flag says unsigned.
    NotSigned,
    SignedAtMissing,
    SignedAtUnparseable,
    /// Dated at or before [`EARLIEST_SIGNATURE`].
    SignedAtTooEarly,
    /// Dated more than [`MAX_CLOCK_SKEW`] ahead of now.
    SignedAtInFuture,
    /// No authenticated email to compare against.
    SessionEmailMissing,
    SignerEmailMissing,
    /// Signer email differs from the expected email, ignoring case.
    EmailMismatch,
    /// The row belongs to another deal.
    DealMismatch,
    OtpNotVerified,
    OtpVerifiedAtMissing,
    OtpVerifiedAtUnparseable,
    IpAddressMissing,
    UserAgentMissing,
}

impl InvalidReason {
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Missing => "no signature recorded",
            Self::NotSigned => "signature flag is not set",
            Self::SignedAtMissing => "signing time is missing",
            Self::SignedAtUnparseable => "signing time cannot be parsed",
            Self::SignedAtTooEarly => "signing time is not after 2020-01-01",
            Self::SignedAtInFuture => "signing time is in the future",
            Self::SessionEmailMissing => "no authenticated email",
            Self::SignerEmailMissing => "signer email is missing",
            Self::EmailMismatch => "signer email does not match",
            Self::DealMismatch => "signature belongs to another deal",
            Self::OtpNotVerified => "OTP was not verified",
            Self::OtpVerifiedAtMissing => "OTP verification time is missing",
            Self::OtpVerifiedAtUnparseable => "OTP verification time cannot be parsed",
            Self::IpAddressMissing => "IP address is missing",
            Self::UserAgentMissing => "user agent is missing",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Reasons collected while verifying, empty when valid.
pub type InvalidReasons = SmallVec<[InvalidReason; 4]>;

/// Outcome of verifying one signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignatureVerdict {
    reasons: InvalidReasons,
}

impl SignatureVerdict {
    /// A verdict with no failing checks.
    pub fn valid() -> Self {
        Self::default()
    }

    /// Verdict for a role that has no signature row.
    pub fn missing() -> Self {
        Self {
            reasons: smallvec![InvalidReason::Missing],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn reasons(&self) -> &[InvalidReason] {
        &self.reasons
    }
}

/// Decide whether `signature` is trustworthy proof of signing.
///
/// Every check runs so the verdict lists all failures:
/// 1. `signed_at` parses, is after 2020-01-01 and at most [`MAX_CLOCK_SKEW`] ahead;
/// 2. `signer_email` matches the expected email, ignoring case, with both present;
/// 3. the row belongs to the deal being viewed;
/// 4. OTP was verified with a parseable verification time;
/// 5. IP address and user agent are present.
pub fn verify_signature(signature: &Signature, context: &VerificationContext<'_>) -> SignatureVerdict {
    let mut reasons = InvalidReasons::new();

    if !signature.signed {
        reasons.push(InvalidReason::NotSigned);
    }

    match signature.signed_at.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        None => reasons.push(InvalidReason::SignedAtMissing),
        Some(raw) => match parse_timestamp(raw) {
            None => reasons.push(InvalidReason::SignedAtUnparseable),
            Some(signed_at) if signed_at <= EARLIEST_SIGNATURE => {
                reasons.push(InvalidReason::SignedAtTooEarly);
            }
            Some(signed_at) if signed_at.duration_since(context.now) > MAX_CLOCK_SKEW => {
                reasons.push(InvalidReason::SignedAtInFuture);
            }
            Some(_) => {}
        },
    }

    let expected = non_blank(context.expected_email);
    let signer = non_blank(signature.signer_email.as_deref());

    match (expected, signer) {
        (None, _) => reasons.push(InvalidReason::SessionEmailMissing),
        (Some(_), None) => reasons.push(InvalidReason::SignerEmailMissing),
        (Some(expected), Some(signer)) if !expected.eq_ignore_ascii_case(signer) => {
            reasons.push(InvalidReason::EmailMismatch);
        }
        _ => {}
    }

    if signature.deal_id != context.deal_id {
        reasons.push(InvalidReason::DealMismatch);
    }

    if !signature.otp_verified {
        reasons.push(InvalidReason::OtpNotVerified);
    }

    match non_blank(signature.otp_verified_at.as_deref()) {
        None => reasons.push(InvalidReason::OtpVerifiedAtMissing),
        Some(raw) if parse_timestamp(raw).is_none() => {
            reasons.push(InvalidReason::OtpVerifiedAtUnparseable);
        }
        Some(_) => {}
    }

    if non_blank(signature.ip_address.as_deref()).is_none() {
        reasons.push(InvalidReason::IpAddressMissing);
    }

    if non_blank(signature.user_agent.as_deref()).is_none() {
        reasons.push(InvalidReason::UserAgentMissing);
    }

    SignatureVerdict { reasons }
}

/// Verify an optional row, treating absence as [`InvalidReason::Missing`].
pub fn verify_optional(
    signature: Option<&Signature>,
    context: &VerificationContext<'_>,
) -> SignatureVerdict {
    signature.map_or_else(SignatureVerdict::missing, |signature| {
        verify_signature(signature, context)
    })
}

/// Whether a new signature may be recorded for a role. Only a valid existing
/// signature blocks re-signing.
pub fn may_sign(existing: Option<&Signature>, context: &VerificationContext<'_>) -> bool {
    !verify_optional(existing, context).is_valid()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Verdicts for both roles of one deal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DualSignatureState {
    /// Creator's verdict.
    pub creator: SignatureVerdict,
    /// Brand's verdict.
    pub brand: SignatureVerdict,
}

impl DualSignatureState {
    /// Verify both roles of a deal, each against that party's registered email.
    pub fn verify(
        deal_id: Uuid,
        creator: (Option<&Signature>, Option<&str>),
        brand: (Option<&Signature>, Option<&str>),
        now: Timestamp,
    ) -> Self {
        let verdict = |(signature, email): (Option<&Signature>, Option<&str>)| {
            verify_optional(
                signature,
                &VerificationContext {
                    deal_id,
                    expected_email: email,
                    now,
                },
            )
        };

        Self {
            creator: verdict(creator),
            brand: verdict(brand),
        }
    }

    pub fn for_role(&self, role: SignerRole) -> &SignatureVerdict {
        match role {
            SignerRole::Creator => &self.creator,
            SignerRole::Brand => &self.brand,
        }
    }

    /// Whether both parties hold a valid signature.
    pub fn both_valid(&self) -> bool {
        self.creator.is_valid() && self.brand.is_valid()
    }
}
