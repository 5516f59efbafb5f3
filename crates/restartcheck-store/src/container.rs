//! Container files
//!
//! A container is stored as a JSON document:
//!
//! ```json
//! {"format": "restartcheck-container", "version": 1, "root": {"attrs": {}, "children": {}}}
//! ```
//!
//! Loading validates every array (dtype/buffer agreement and element count)
//! so the comparison kernel only sees well-formed trees.

use crate::atomic::atomic_write;
use crate::errors::{invalid_container, io_error_at, serialization_error, Result};
use restartcheck_core::container::Group;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Format tag of a container document
pub const FORMAT: &str = "restartcheck-container";

/// Current document version
pub const VERSION: u32 = 1;

/// Extension used for containers when the target file has none
pub const DEFAULT_EXTENSION: &str = "json";

#[derive(Debug, Deserialize)]
struct ContainerDocument {
    format: String,
    version: u32,
    root: Group,
}

/// Parse container bytes; `path` is used for error context only
pub fn parse_container(bytes: &[u8], path: &Path) -> Result<Group> {
    let doc: ContainerDocument = serde_json::from_slice(bytes)
        .map_err(|e| invalid_container(path, format!("not a container document: {}", e)))?;

    if doc.format != FORMAT {
        return Err(invalid_container(
            path,
            format!("unknown format '{}', expected '{}'", doc.format, FORMAT),
        ));
    }
    if doc.version != VERSION {
        return Err(invalid_container(
            path,
            format!("unsupported version {}, expected {}", doc.version, VERSION),
        ));
    }

    doc.root
        .validate_tree("/")
        .map_err(|(at, reason)| invalid_container(path, format!("{}: {}", at, reason)))?;
    Ok(doc.root)
}

/// Read and validate a container file
pub fn read_container(path: &Path) -> Result<Group> {
    let bytes = fs::read(path).map_err(|e| io_error_at("read_container", path, e))?;
    parse_container(&bytes, path)
}

/// Serialize a container tree
pub fn container_to_bytes(root: &Group) -> Result<Vec<u8>> {
    let doc = ContainerDocumentRef {
        format: FORMAT,
        version: VERSION,
        root,
    };
    serde_json::to_vec_pretty(&doc).map_err(|e| serialization_error("write_container", e))
}

#[derive(Serialize)]
struct ContainerDocumentRef<'a> {
    format: &'a str,
    version: u32,
    root: &'a Group,
}

/// Atomically write a container file
pub fn write_container(path: &Path, root: &Group) -> Result<()> {
    atomic_write(path, &container_to_bytes(root)?)
}
