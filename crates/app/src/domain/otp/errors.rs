//! OTP service errors.

use creator_deals::{deals::TransitionError, otp::OtpError, signatures::SignerRole};
use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::{database::StoreTimeout, domain::deals::DealsServiceError};

const ACTIVE_CHALLENGE_CONSTRAINT: &str = "otp_challenges_active_idx";

#[derive(Debug, Error)]
pub enum OtpServiceError {
    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error("deal not found")]
    NotFound,

    /// The party has no registered email to deliver a code to.
    #[error("no registered email for the {0} on this deal")]
    NoRecipient(SignerRole),

    /// The signer is not the party registered for this role.
    #[error("signer email does not match the registered {0}")]
    SignerMismatch(SignerRole),

    /// Name, email, IP address and user agent are all required to sign.
    #[error("signer details are incomplete")]
    IncompleteSigner,

    /// A valid signature already exists for this role.
    #[error("deal already signed by this party")]
    AlreadySigned,

    /// Another code was issued for the same deal and role at the same moment.
    #[error("a code is already being issued; retry")]
    ConcurrentIssue,

    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The store did not answer in time. Nothing was verified.
    #[error("OTP store unavailable")]
    Unavailable(#[from] StoreTimeout),

    #[error(transparent)]
    Deals(#[from] DealsServiceError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OtpServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let violation = error
            .as_database_error()
            .filter(|database_error| database_error.kind() == ErrorKind::UniqueViolation)
            .map(|database_error| database_error.constraint() == Some(ACTIVE_CHALLENGE_CONSTRAINT));

        match violation {
            Some(true) => Self::ConcurrentIssue,
            Some(false) => Self::AlreadySigned,
            None => Self::Sql(error),
        }
    }
}
