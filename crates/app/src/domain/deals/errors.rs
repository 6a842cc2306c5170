//! Deals service errors.

use creator_deals::{
    deals::{DeletionRefused, ExecutionError, TransitionError},
    validation::ValidationError,
    variables::DerivationError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::database::StoreTimeout;

#[derive(Debug, Error)]
pub enum DealsServiceError {
    #[error("deal not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    /// The store did not answer in time. Nothing is assumed about the outcome.
    #[error("deal store unavailable")]
    Unavailable(#[from] StoreTimeout),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    DeletionRefused(#[from] DeletionRefused),

    /// Verified acceptance is only reachable through brand OTP verification.
    #[error("accepted_verified can only be set by verifying the brand's OTP")]
    VerificationRequired,

    /// The deal changed between the guard check and the write.
    #[error("deal changed concurrently; retry")]
    ConcurrentUpdate,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for DealsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
