//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";
pub const FIELD_WORKER: &str = "worker";

// Comparison identifiers
pub const FIELD_PAIR_INDEX: &str = "pair_index";
pub const FIELD_TARGET: &str = "target";
pub const FIELD_BASELINE: &str = "baseline";
pub const FIELD_PATH: &str = "path";

// Collection sizes
pub const FIELD_N_PAIRS: &str = "n_pairs";
pub const FIELD_N_DIFFERING: &str = "n_differing";
pub const FIELD_N_ERRORS: &str = "n_errors";
pub const FIELD_N_WARNINGS: &str = "n_warnings";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
