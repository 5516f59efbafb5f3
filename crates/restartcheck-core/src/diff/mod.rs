//! Container tree comparison.
//!
//! Walks a target container and a baseline container in lock-step and
//! produces an ordered list of findings.
//!
//! ## Entry point
//!
//! ```
//! use restartcheck_core::config::ComparisonConfig;
//! use restartcheck_core::container::{Array, Group};
//! use restartcheck_core::diff::compare_trees;
//!
//! let target = Group::new().with_dataset("x", Array::f64s(vec![1.0, 2.0]));
//! let baseline = Group::new().with_dataset("x", Array::f64s(vec![1.0, 2.5]));
//! let outcome = compare_trees(&target, &baseline, &ComparisonConfig::default());
//! assert!(outcome.differs());
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: attributes and children are visited in name order, so
//!   identical inputs produce identical findings in identical order.
//! - **Exclusions are absolute**: an excluded path is never visited and never
//!   reported.
//! - **No shared state**: every step returns its findings as a value.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{compare_attributes, compare_groups, compare_trees};
pub use human_summary::{render_pair_verdict, render_run_summary};
pub use model::{ComparisonOutcome, Finding, Severity};
