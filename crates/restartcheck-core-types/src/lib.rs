//! Core types shared across restartcheck crates
//!
//! - **Correlation types**: RunId, WorkerId
//! - **Schema constants**: Canonical field keys and event names for logging

pub mod correlation;
pub mod schema;

pub use correlation::{RunId, WorkerId};
