//! Creator Deals prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    currency::{FormattingError, FormattingInvariantError, format_inr, format_inr_decimal},
    deals::{
        BrandResponseStatus, ContractStatus, Deal, DealAmount, DealExecutionStatus, DealTerms,
        DeletionRefused, ExecutionError, TransitionError, advance_execution, complete_execution,
        derive_contract_status,
    },
    deliverables::{DeliverableItem, Deliverables, StructuredDeliverable},
    jurisdiction::resolve_jurisdiction,
    otp::{DEFAULT_OTP_TTL, OtpChallenge, OtpError, OtpOutcome, check_code},
    parties::{BrandInfo, CreatorInfo, PartyInfo, check_completeness},
    platforms::{Platform, Platforms, normalize_platforms},
    signatures::{
        DualSignatureState, InvalidReason, SessionContext, Signature, SignatureVerdict,
        SignerRole, VerificationContext, verify_signature,
    },
    validation::{RequiredField, ValidationError},
    variables::{ContractVariables, DerivationError, derive_contract_variables},
};
