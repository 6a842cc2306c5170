//! Deals

pub mod errors;
pub mod records;
pub mod repository;
pub mod service;

pub use errors::DealsServiceError;
pub use service::*;
