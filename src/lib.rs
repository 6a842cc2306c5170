//! Creator Deals
//!
//! Deal and contract lifecycle rules for brand/creator collaborations: deriving the
//! variables a contract template is rendered from, tracking a deal through brand
//! response and dual signature, and deciding whether a stored signature can be
//! trusted as proof of signing.

pub mod currency;
pub mod deals;
pub mod deliverables;
pub mod jurisdiction;
pub mod otp;
pub mod parties;
pub mod platforms;
pub mod prelude;
pub mod signatures;
pub mod timestamps;
pub mod validation;
pub mod variables;
pub mod words;
