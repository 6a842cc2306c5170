//! Signatures service errors.

use sqlx::Error;
use thiserror::Error;

use crate::database::StoreTimeout;

#[derive(Debug, Error)]
pub enum SignaturesServiceError {
    #[error("deal not found")]
    NotFound,

    /// The store did not answer in time; the signature is treated as unavailable.
    #[error("signature store unavailable")]
    Unavailable(#[from] StoreTimeout),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for SignaturesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
