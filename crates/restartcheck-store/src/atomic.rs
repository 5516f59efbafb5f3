//! Atomic write primitives
//!
//! Uses temp→rename pattern so a report or diff container is never observed
//! half-written

use crate::errors::{io_error_at, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn temp_path_for(target_path: &Path) -> PathBuf {
    let mut name = target_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target_path.with_file_name(name)
}

/// Atomically write bytes to a file
///
/// Uses temp file + rename to ensure atomic write
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = target_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error_at("create_output_dir", parent, e))?;
    }

    let temp_path = temp_path_for(target_path);
    fs::write(&temp_path, content).map_err(|e| io_error_at("write_temp", &temp_path, e))?;
    fs::rename(&temp_path, target_path)
        .map_err(|e| io_error_at("rename_temp", target_path, e))?;

    Ok(())
}
