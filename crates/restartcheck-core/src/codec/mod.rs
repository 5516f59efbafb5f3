//! Array codecs
//!
//! Converts stored representations into logical arrays before comparison.

pub mod lvarray;

pub use lvarray::{decode, decode_array, encode, DIMENSIONS, PERMUTATION, VALUES};
