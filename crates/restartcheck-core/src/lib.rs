//! restartcheck core - comparison kernel for simulation restart containers
//!
//! This crate provides the in-memory pieces of a restart check:
//! - Container model (groups, datasets, attributes, external links)
//! - LvArray decoding of permuted flat buffers
//! - Tolerance laws for float, integer and string data
//! - Deterministic lock-step tree comparison
//! - Diagnostics rendering and diff containers
//!
//! File access, pattern resolution and parallel dispatch live in the store
//! and engine crates.

pub mod codec;
pub mod config;
pub mod container;
pub mod diagnostics;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod tolerance;

// Re-export commonly used types
pub use config::{ComparisonConfig, ExclusionSet, Tolerance};
pub use container::{Array, Dataset, Group, Node};
pub use diagnostics::{DiagnosticsSink, DiffContainer};
pub use diff::{compare_trees, ComparisonOutcome, Finding, Severity};
pub use errors::{ExError, ExErrorKind, LvArrayError, Result};
