//! Deals
//!
//! A deal tracks one brand/creator collaboration. Stored status fields are loosely
//! typed legacy strings; they are normalised into the enums below at the boundary so
//! the lifecycle rules only ever see canonical states.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    deliverables::Deliverables,
    signatures::DualSignatureState,
    validation::ValidationError,
};

/// The brand's position in the negotiation, independent of signatures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandResponseStatus {
    /// No response from the brand yet.
    #[default]
    Pending,
    /// Terms are being discussed.
    Negotiating,
    /// The brand accepted the terms; a contract may be generated.
    Accepted,
    /// Accepted and confirmed by the brand through OTP. Terminal.
    AcceptedVerified,
    /// The brand declined the deal.
    Rejected,
}

impl BrandResponseStatus {
    /// Canonical storage value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Negotiating => "negotiating",
            Self::Accepted => "accepted",
            Self::AcceptedVerified => "accepted_verified",
            Self::Rejected => "rejected",
        }
    }

    /// Normalise a stored or legacy status string. Unknown and missing values are
    /// pending. Legacy rows that recorded a sent or signed contract had already
    /// been accepted.
    pub fn normalize(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Pending;
        };

        let key = raw.trim().to_lowercase().replace(['-', ' '], "_");

        match key.as_str() {
            "accepted_verified" | "verified" | "accepted_and_verified" => Self::AcceptedVerified,
            "accepted" | "approved" | "confirmed" | "contract_ready" | "sent" | "contract_sent"
            | "signed" | "contract_signed" => Self::Accepted,
            "negotiating" | "negotiation" | "countered" | "counter_offer" | "changes_requested" => {
                Self::Negotiating
            }
            "rejected" | "declined" | "cancelled" => Self::Rejected,
            _ => Self::Pending,
        }
    }

    /// Whether this response permits contract generation.
    #[must_use]
    pub const fn allows_contract_generation(self) -> bool {
        matches!(self, Self::Accepted | Self::AcceptedVerified)
    }

    /// Apply a requested status change.
    ///
    /// `AcceptedVerified` is sticky: any later request leaves it unchanged. Only an
    /// accepted deal may become verified, and nothing returns to pending.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] when the change is not part of the lifecycle.
    pub fn transition(self, next: Self) -> Result<Self, TransitionError> {
        use BrandResponseStatus::{Accepted, AcceptedVerified, Negotiating, Pending, Rejected};

        match (self, next) {
            (AcceptedVerified, _) => Ok(AcceptedVerified),
            (current, next) if current == next => Ok(current),
            (Pending | Negotiating, Negotiating | Accepted | Rejected) | (Accepted, AcceptedVerified) => {
                Ok(next)
            }
            (from, to) => Err(TransitionError { from, to }),
        }
    }
}

impl fmt::Display for BrandResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrandResponseStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "negotiating" => Ok(Self::Negotiating),
            "accepted" => Ok(Self::Accepted),
            "accepted_verified" => Ok(Self::AcceptedVerified),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A status string that is not one of the canonical values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status {0:?}")]
pub struct UnknownStatus(pub String);

/// A status change outside the brand response lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("brand response cannot move from {from} to {to}")]
pub struct TransitionError {
    /// Current status.
    pub from: BrandResponseStatus,
    /// Requested status.
    pub to: BrandResponseStatus,
}

/// Execution progress after both parties have signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealExecutionStatus {
    /// Both signatures are valid.
    Signed,
    Completed,
}

impl DealExecutionStatus {
    /// Canonical storage value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signed => "signed",
            Self::Completed => "completed",
        }
    }

    /// Normalise a stored execution status. Unknown values mean "not executed".
    pub fn normalize(raw: Option<&str>) -> Option<Self> {
        match raw?.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "signed" | "fully_signed" | "executed" => Some(Self::Signed),
            "completed" | "complete" | "done" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Errors advancing execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Both signatures must be valid before the deal counts as signed.
    #[error("both parties must hold a valid signature")]
    SignaturesIncomplete,

    /// Only a signed deal may be completed.
    #[error("deal must be signed before it can be completed")]
    NotSigned,
}

/// Advance execution status from the current dual signature state.
///
/// A deal becomes signed only when both signatures verify. Existing execution
/// progress is never rolled back.
pub fn advance_execution(
    current: Option<DealExecutionStatus>,
    signatures: &DualSignatureState,
) -> Option<DealExecutionStatus> {
    match current {
        Some(status) => Some(status),
        None if signatures.both_valid() => Some(DealExecutionStatus::Signed),
        None => None,
    }
}

/// Mark a deal completed.
///
/// # Errors
///
/// Returns [`ExecutionError::NotSigned`] when the deal has not been signed yet.
pub fn complete_execution(
    current: Option<DealExecutionStatus>,
) -> Result<DealExecutionStatus, ExecutionError> {
    match current {
        Some(DealExecutionStatus::Signed | DealExecutionStatus::Completed) => {
            Ok(DealExecutionStatus::Completed)
        }
        None => Err(ExecutionError::NotSigned),
    }
}

/// The contract status a badge renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContractStatus {
    Completed,
    /// Both signatures are valid.
    Signed,
    AcceptedVerified,
    Accepted,
    /// A contract went out but the brand has not accepted yet.
    Sent,
    Negotiating,
    Rejected,
    /// Only the creator's submission exists.
    DetailsSubmitted,
}

impl ContractStatus {
    /// Badge label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Signed => "Signed",
            Self::AcceptedVerified => "Accepted & Verified",
            Self::Accepted => "Accepted",
            Self::Sent => "Sent",
            Self::Negotiating => "Negotiating",
            Self::Rejected => "Rejected",
            Self::DetailsSubmitted => "Details Submitted",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the contract status from stored fields.
///
/// Priority: execution status, then an accepted brand response, then a sent
/// contract, then negotiation, then rejection, otherwise "Details Submitted".
pub fn derive_contract_status(
    execution: Option<DealExecutionStatus>,
    brand_response: BrandResponseStatus,
    contract_sent: bool,
) -> ContractStatus {
    match (execution, brand_response) {
        (Some(DealExecutionStatus::Completed), _) => ContractStatus::Completed,
        (Some(DealExecutionStatus::Signed), _) => ContractStatus::Signed,
        (None, BrandResponseStatus::AcceptedVerified) => ContractStatus::AcceptedVerified,
        (None, BrandResponseStatus::Accepted) => ContractStatus::Accepted,
        (None, _) if contract_sent => ContractStatus::Sent,
        (None, BrandResponseStatus::Negotiating) => ContractStatus::Negotiating,
        (None, BrandResponseStatus::Rejected) => ContractStatus::Rejected,
        (None, BrandResponseStatus::Pending) => ContractStatus::DetailsSubmitted,
    }
}

/// A deal amount as it arrives from storage or a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DealAmount {
    /// A plain number.
    Number(f64),
    /// Text such as `"₹1,50,000"`.
    Text(String),
}

impl Default for DealAmount {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl DealAmount {
    /// Read the amount as a non-negative decimal.
    ///
    /// Text may carry grouping commas and a currency prefix (`₹`, `Rs.`, `INR`).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the amount is negative, not finite, or not
    /// numeric.
    pub fn to_decimal(&self) -> Result<Decimal, ValidationError> {
        let amount = match self {
            Self::Number(number) => {
                if !number.is_finite() {
                    return Err(ValidationError::NonFiniteAmount);
                }

                Decimal::try_from(*number)
                    .map_err(|_error| ValidationError::NonNumericAmount(number.to_string()))?
            }
            Self::Text(text) => {
                let cleaned: String = text
                    .trim()
                    .trim_start_matches(['\u{20B9}', '\u{00B9}'])
                    .trim_start_matches("INR")
                    .trim_start_matches("Rs.")
                    .trim_start_matches("Rs")
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != ',')
                    .collect();

                cleaned
                    .parse::<Decimal>()
                    .map_err(|_error| ValidationError::NonNumericAmount(text.clone()))?
            }
        };

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::NegativeAmount);
        }

        Ok(amount)
    }
}

/// Commercial and legal terms captured alongside a deal. Everything is optional;
/// contract derivation fills in documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealTerms {
    /// Raw platform labels, normalised at derivation time.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Defaults to bank transfer.
    pub payment_method: Option<String>,
    /// Defaults to seven days after publication.
    pub payment_timeline: Option<String>,
    /// Usage rights type, non-exclusive by default.
    pub usage_type: Option<String>,
    /// Usage rights duration, six months by default.
    pub usage_duration: Option<String>,
    /// Whether the brand may run the content as paid ads.
    pub paid_ads_allowed: Option<bool>,
    /// Whether the brand may post through the creator's handle.
    pub whitelisting_allowed: Option<bool>,
    /// Whether an exclusivity clause applies.
    pub exclusivity_enabled: Option<bool>,
    /// Product category the exclusivity clause covers.
    pub exclusivity_category: Option<String>,
    /// Exclusivity length in days, 30 by default.
    pub exclusivity_period_days: Option<u32>,
    /// Requested notice period, clamped to 30, 15 or 7 days.
    pub termination_notice_days: Option<u32>,
    /// Governing-law city chosen explicitly for this deal.
    pub jurisdiction_city: Option<String>,
}

/// One brand/creator collaboration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: Uuid,
    /// Owning creator profile.
    pub creator_id: Uuid,
    pub brand_name: String,
    /// Registered brand email; the brand's signature must match it.
    pub brand_email: Option<String>,
    pub brand_address: Option<String>,
    pub deal_amount: DealAmount,
    pub deliverables: Deliverables,
    /// Content due date, used for the delivery window.
    pub due_date: Option<String>,
    pub payment_expected_date: Option<String>,

    /// Free-form legacy status tag.
    pub status: Option<String>,
    pub brand_response_status: BrandResponseStatus,
    /// Generated contract, set once it has been sent.
    pub contract_file_url: Option<String>,
    pub signed_contract_url: Option<String>,
    /// `None` until both parties have signed.
    pub deal_execution_status: Option<DealExecutionStatus>,

    #[serde(default)]
    pub terms: DealTerms,
}

impl Deal {
    /// Contract status for this deal's stored fields.
    pub fn contract_status(&self) -> ContractStatus {
        derive_contract_status(
            self.deal_execution_status,
            self.brand_response_status,
            self.contract_sent(),
        )
    }

    /// Whether a contract has gone out to the brand.
    pub fn contract_sent(&self) -> bool {
        self.contract_file_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
            || self
                .status
                .as_deref()
                .is_some_and(|status| status.to_lowercase().contains("sent"))
    }

    /// Whether the deal has reached a signed or completed execution state.
    pub fn is_executed(&self) -> bool {
        self.deal_execution_status.is_some()
    }

    /// Check the brand response allows generating a contract.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotReadyForContract`] otherwise.
    pub fn ensure_contract_ready(&self) -> Result<(), ValidationError> {
        if self.brand_response_status.allows_contract_generation() {
            Ok(())
        } else {
            Err(ValidationError::NotReadyForContract(
                self.brand_response_status,
            ))
        }
    }

    /// Check the deal may be hard-deleted.
    ///
    /// # Errors
    ///
    /// Returns a [`DeletionRefused`] reason when the deal is executed or any signature
    /// row exists for it.
    pub fn ensure_deletable(&self, signature_count: u64) -> Result<(), DeletionRefused> {
        if let Some(status) = self.deal_execution_status {
            return Err(DeletionRefused::Executed(status));
        }

        if signature_count > 0 {
            return Err(DeletionRefused::SignaturesExist(signature_count));
        }

        Ok(())
    }
}

/// Why a deal cannot be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeletionRefused {
    #[error("deal is {} and cannot be deleted", .0.as_str())]
    Executed(DealExecutionStatus),

    #[error("deal has {0} signature record(s) and cannot be deleted")]
    SignaturesExist(u64),
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::signatures::SignatureVerdict;

    #[test]
    fn normalize_maps_legacy_values() {
        assert_eq!(BrandResponseStatus::normalize(None), BrandResponseStatus::Pending);
        assert_eq!(
            BrandResponseStatus::normalize(Some("Accepted-Verified")),
            BrandResponseStatus::AcceptedVerified
        );
        assert_eq!(
            BrandResponseStatus::normalize(Some("Contract Ready")),
            BrandResponseStatus::Accepted
        );
        assert_eq!(
            BrandResponseStatus::normalize(Some("counter offer")),
            BrandResponseStatus::Negotiating
        );
        assert_eq!(
            BrandResponseStatus::normalize(Some("declined")),
            BrandResponseStatus::Rejected
        );
        assert_eq!(
            BrandResponseStatus::normalize(Some("whatever")),
            BrandResponseStatus::Pending
        );
    }

    #[test]
    fn legacy_sent_and_signed_rows_count_as_accepted() {
        for raw in ["Signed", "signed", "Contract Sent", "contract_sent", "sent", "contract-signed"] {
            let status = BrandResponseStatus::normalize(Some(raw));

            assert_eq!(status, BrandResponseStatus::Accepted, "{raw}");
            assert!(status.allows_contract_generation(), "{raw}");
        }
    }

    #[test]
    fn pending_can_move_to_negotiating_accepted_or_rejected() -> TestResult {
        for next in [
            BrandResponseStatus::Negotiating,
            BrandResponseStatus::Accepted,
            BrandResponseStatus::Rejected,
        ] {
            assert_eq!(BrandResponseStatus::Pending.transition(next)?, next);
        }

        Ok(())
    }

    #[test]
    fn only_accepted_can_become_verified() {
        assert_eq!(
            BrandResponseStatus::Accepted.transition(BrandResponseStatus::AcceptedVerified),
            Ok(BrandResponseStatus::AcceptedVerified)
        );
        assert!(
            BrandResponseStatus::Pending
                .transition(BrandResponseStatus::AcceptedVerified)
                .is_err()
        );
        assert!(
            BrandResponseStatus::Negotiating
                .transition(BrandResponseStatus::AcceptedVerified)
                .is_err()
        );
    }

    #[test]
    fn nothing_returns_to_pending() {
        assert!(
            BrandResponseStatus::Accepted
                .transition(BrandResponseStatus::Pending)
                .is_err()
        );
        assert!(
            BrandResponseStatus::Negotiating
                .transition(BrandResponseStatus::Pending)
                .is_err()
        );
    }

    #[test]
    fn accepted_verified_is_sticky() {
        for next in [
            BrandResponseStatus::Pending,
            BrandResponseStatus::Negotiating,
            BrandResponseStatus::Accepted,
            BrandResponseStatus::Rejected,
            BrandResponseStatus::AcceptedVerified,
        ] {
            assert_eq!(
                BrandResponseStatus::AcceptedVerified.transition(next),
                Ok(BrandResponseStatus::AcceptedVerified)
            );
        }
    }

    #[test]
    fn contract_status_priority() {
        assert_eq!(
            derive_contract_status(
                Some(DealExecutionStatus::Completed),
                BrandResponseStatus::Rejected,
                false
            ),
            ContractStatus::Completed
        );
        assert_eq!(
            derive_contract_status(
                Some(DealExecutionStatus::Signed),
                BrandResponseStatus::Pending,
                true
            ),
            ContractStatus::Signed
        );
        assert_eq!(
            derive_contract_status(None, BrandResponseStatus::AcceptedVerified, true),
            ContractStatus::AcceptedVerified
        );
        assert_eq!(
            derive_contract_status(None, BrandResponseStatus::Accepted, true),
            ContractStatus::Accepted
        );
        assert_eq!(
            derive_contract_status(None, BrandResponseStatus::Negotiating, true),
            ContractStatus::Sent
        );
        assert_eq!(
            derive_contract_status(None, BrandResponseStatus::Negotiating, false),
            ContractStatus::Negotiating
        );
        assert_eq!(
            derive_contract_status(None, BrandResponseStatus::Rejected, false),
            ContractStatus::Rejected
        );
        assert_eq!(
            derive_contract_status(None, BrandResponseStatus::Pending, false),
            ContractStatus::DetailsSubmitted
        );
    }

    #[test]
    fn legacy_sent_status_counts_as_sent() {
        let deal = Deal {
            status: Some("Contract Sent".to_string()),
            ..Deal::default()
        };

        assert_eq!(deal.contract_status(), ContractStatus::Sent);
    }

    #[test]
    fn execution_advances_only_with_both_signatures() {
        let one_valid = DualSignatureState {
            creator: SignatureVerdict::valid(),
            brand: SignatureVerdict::missing(),
        };

        let both_valid = DualSignatureState {
            creator: SignatureVerdict::valid(),
            brand: SignatureVerdict::valid(),
        };

        assert_eq!(advance_execution(None, &one_valid), None);
        assert_eq!(
            advance_execution(None, &both_valid),
            Some(DealExecutionStatus::Signed)
        );
        assert_eq!(
            advance_execution(Some(DealExecutionStatus::Completed), &one_valid),
            Some(DealExecutionStatus::Completed)
        );
    }

    #[test]
    fn completion_requires_signed() {
        assert_eq!(complete_execution(None), Err(ExecutionError::NotSigned));
        assert_eq!(
            complete_execution(Some(DealExecutionStatus::Signed)),
            Ok(DealExecutionStatus::Completed)
        );
    }

    #[test]
    fn amounts_parse_from_numbers_and_text() -> TestResult {
        assert_eq!(DealAmount::Number(15_000.0).to_decimal()?, Decimal::from(15_000));
        assert_eq!(
            DealAmount::Text("₹1,50,000".to_string()).to_decimal()?,
            Decimal::from(150_000)
        );
        assert_eq!(
            DealAmount::Text("Rs. 2,500".to_string()).to_decimal()?,
            Decimal::from(2_500)
        );

        Ok(())
    }

    #[test]
    fn invalid_amounts_are_rejected() {
        assert_eq!(
            DealAmount::Number(-5.0).to_decimal(),
            Err(ValidationError::NegativeAmount)
        );
        assert_eq!(
            DealAmount::Number(f64::NAN).to_decimal(),
            Err(ValidationError::NonFiniteAmount)
        );
        assert_eq!(
            DealAmount::Text("-10".to_string()).to_decimal(),
            Err(ValidationError::NegativeAmount)
        );
        assert!(matches!(
            DealAmount::Text("fifteen".to_string()).to_decimal(),
            Err(ValidationError::NonNumericAmount(_))
        ));
    }

    #[test]
    fn executed_or_signed_deals_cannot_be_deleted() {
        let deal = Deal {
            deal_execution_status: Some(DealExecutionStatus::Signed),
            ..Deal::default()
        };

        assert_eq!(
            deal.ensure_deletable(0),
            Err(DeletionRefused::Executed(DealExecutionStatus::Signed))
        );
        assert_eq!(
            Deal::default().ensure_deletable(1),
            Err(DeletionRefused::SignaturesExist(1))
        );
        assert_eq!(Deal::default().ensure_deletable(0), Ok(()));
    }

    #[test]
    fn contract_generation_requires_acceptance() {
        let pending = Deal::default();
        let accepted = Deal {
            brand_response_status: BrandResponseStatus::Accepted,
            ..Deal::default()
        };

        assert_eq!(
            pending.ensure_contract_ready(),
            Err(ValidationError::NotReadyForContract(
                BrandResponseStatus::Pending
            ))
        );
        assert_eq!(accepted.ensure_contract_ready(), Ok(()));
    }
}
