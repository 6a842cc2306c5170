//! OTP signing

pub mod code;
pub mod errors;
pub mod records;
pub mod repository;
pub mod service;

pub use code::OtpCode;
pub use errors::OtpServiceError;
pub use service::*;
