//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! core comparison logic and file access.

pub mod check;
