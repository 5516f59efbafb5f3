//! Error handling for restartcheck-store
//!
//! Wraps restartcheck-core ExError with file-level helpers

use restartcheck_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error that names the file involved
pub fn io_error_at(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    io_error(operation, err).with_path(path.display().to_string())
}

/// Create a container format error
pub fn invalid_container(path: &Path, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidContainer)
        .with_op("read_container")
        .with_path(path.display().to_string())
        .with_message(reason)
}

/// Create a serialization error
pub fn serialization_error(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a root file error
pub fn invalid_root_file(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidRootFile)
        .with_op("read_root_file")
        .with_message(reason)
}

/// Create a no-match error for a file pattern
pub fn no_match(pattern: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op("resolve_pattern")
        .with_message(format!("No files found matching {}.", pattern))
}
