//! restartcheck store - file-level access for restart checks
//!
//! Provides:
//! - Container file reading and atomic writing
//! - File-pattern resolution to the greatest matching file
//! - Root-file indirection into per-shard file pairs

pub mod atomic;
pub mod container;
pub mod errors;
pub mod resolver;
pub mod root;

// Re-export key types
pub use container::{read_container, write_container};
pub use errors::Result;
pub use resolver::{output_base_path, resolve_greatest, FilePair};
pub use root::{expand_shards, read_root_info, RootInfo, TemplateError};
