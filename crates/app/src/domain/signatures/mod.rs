//! Signatures

pub mod errors;
pub mod records;
pub mod repository;
pub mod service;

pub use errors::SignaturesServiceError;
pub use service::*;
