//! Validation errors

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

use crate::deals::BrandResponseStatus;

/// A field that must be present and meaningful before a contract is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    /// Brand legal name, not a placeholder.
    BrandName,
    /// Brand postal address with at least some detail.
    BrandAddress,
    /// Brand contact email.
    BrandEmail,
    /// Creator full name.
    CreatorName,
    /// Creator postal address.
    CreatorAddress,
    /// Creator contact email.
    CreatorEmail,
    /// A positive deal amount.
    DealAmount,
    /// At least one deliverable.
    Deliverables,
    /// A governing-law city.
    Jurisdiction,
}

impl RequiredField {
    /// Human readable field label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BrandName => "brand name",
            Self::BrandAddress => "brand address",
            Self::BrandEmail => "brand email",
            Self::CreatorName => "creator name",
            Self::CreatorAddress => "creator address",
            Self::CreatorEmail => "creator email",
            Self::DealAmount => "deal amount",
            Self::Deliverables => "deliverables",
            Self::Jurisdiction => "jurisdiction",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields found missing or unusable, in the order they were checked.
pub type MissingFields = SmallVec<[RequiredField; 6]>;

/// Bad or missing input data. Always surfaced, never defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are missing or placeholders.
    #[error("missing or invalid fields: {}", join_fields(.0))]
    MissingFields(MissingFields),

    /// The deal amount is negative.
    #[error("deal amount must not be negative")]
    NegativeAmount,

    /// The deal amount is NaN or infinite.
    #[error("deal amount must be a finite number")]
    NonFiniteAmount,

    /// The deal amount could not be read as a number.
    #[error("deal amount {0:?} is not a number")]
    NonNumericAmount(String),

    /// The brand has not accepted the deal yet.
    #[error("contract cannot be generated while brand response is {}", .0.as_str())]
    NotReadyForContract(BrandResponseStatus),
}

impl ValidationError {
    /// Missing fields carried by this error, if any.
    pub fn missing_fields(&self) -> &[RequiredField] {
        match self {
            Self::MissingFields(fields) => fields,
            _ => &[],
        }
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}
