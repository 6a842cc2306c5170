//! OTP Records

use creator_deals::{
    deals::{BrandResponseStatus, DealExecutionStatus},
    otp::OtpChallenge,
    signatures::Signature,
};
use jiff::Timestamp;
use uuid::Uuid;

use crate::uuids::TypedUuid;

/// Challenge UUID
pub type ChallengeUuid = TypedUuid<OtpChallenge>;

/// Writes that make up one successful verification. Applied together or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningRecord {
    pub challenge: ChallengeUuid,
    pub consumed_at: Timestamp,
    pub signature: Signature,

    /// Invalid active row replaced by this signature.
    pub supersedes: Option<Uuid>,

    /// Brand response to store alongside a brand signature.
    pub brand_response: Option<BrandResponseStatus>,

    /// Execution status reached now that this signature is recorded.
    pub execution: Option<DealExecutionStatus>,
}
