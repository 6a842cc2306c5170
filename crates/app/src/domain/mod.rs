//! Deal lifecycle domain concerns

pub mod deals;
pub mod notifications;
pub mod otp;
pub mod signatures;
