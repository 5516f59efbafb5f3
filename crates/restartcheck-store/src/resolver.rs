//! File-pair resolution
//!
//! A file pattern is a path whose basename is a regular expression. The
//! pattern resolves to the lexicographically greatest directory entry whose
//! name matches at the start.

use crate::errors::{io_error_at, no_match, Result};
use restartcheck_core::errors::{ExError, ExErrorKind};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// One unit of comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub index: usize,
    pub target: PathBuf,
    pub baseline: PathBuf,
}

/// Split a pattern at its last `/` into (directory, basename regex)
fn split_pattern(pattern: &str) -> (&str, &str) {
    match pattern.rfind('/') {
        Some(0) => ("/", &pattern[1..]),
        Some(i) => (&pattern[..i], &pattern[i + 1..]),
        None => (".", pattern),
    }
}

/// Resolve a pattern to the greatest matching path, if any
pub fn resolve_greatest(pattern: &str) -> Result<Option<PathBuf>> {
    let (directory, name_pattern) = split_pattern(pattern);
    let dir = Path::new(directory);
    if !dir.is_dir() {
        return Ok(None);
    }

    let regex = Regex::new(&format!("^(?:{})", name_pattern)).map_err(|e| {
        ExError::new(ExErrorKind::InvalidPattern)
            .with_op("resolve_pattern")
            .with_message(format!("invalid file pattern '{}': {}", pattern, e))
    })?;

    let mut best: Option<String> = None;
    for entry in fs::read_dir(dir).map_err(|e| io_error_at("list_directory", dir, e))? {
        let entry = entry.map_err(|e| io_error_at("list_directory", dir, e))?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if regex.is_match(&name) && best.as_deref().map_or(true, |b| name.as_str() > b) {
            best = Some(name);
        }
    }

    let resolved = best.map(|name| dir.join(name));
    tracing::debug!(pattern, resolved = ?resolved, "resolved file pattern");
    Ok(resolved)
}

/// Resolve a pattern, failing with `NotFound` when nothing matches
pub fn resolve_required(pattern: &str) -> Result<PathBuf> {
    resolve_greatest(pattern)?.ok_or_else(|| no_match(pattern))
}

/// The resolved target path with its last extension removed
pub fn output_base_path(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// Extension of `path`, or the default container extension
pub fn extension_or_default(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or(crate::container::DEFAULT_EXTENSION)
        .to_string()
}
