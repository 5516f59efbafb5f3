//! restartcheck engine - orchestration of a check run
//!
//! Coordinates the comparison kernel in `restartcheck-core` with file access
//! in `restartcheck-store`, and runs the per-pair comparisons on a pool of
//! worker threads.
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging (`log_op_start!` / `log_op_end!` /
//! `log_op_error!`) for a run and for each pair. Lower layers only emit
//! `tracing::debug!` details.

pub mod commands;
pub mod dispatch;

pub use commands::check::{check, CheckOptions, CheckReport};
pub use dispatch::{dispatch, DispatchOutcome, PairResult};
