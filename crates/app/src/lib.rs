//! Persistence, service orchestration and configuration for the deal lifecycle.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod logging;

mod uuids;

pub use uuids::TypedUuid;
