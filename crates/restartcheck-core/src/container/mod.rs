//! In-memory container model.
//!
//! Containers are read-only inputs to a comparison. Loading them from disk
//! lives in `restartcheck-store`.

pub mod model;

pub use model::{
    checked_product, format_index, path_join, unravel_index, Array, Buffer, Dataset, Dtype, ElementKind,
    ExternalLink, Group, Node,
};
