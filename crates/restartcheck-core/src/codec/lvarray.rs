//! LvArray decoding.
//!
//! An LvArray stores a logical N-dimensional array as a flat buffer in which
//! axis `permutation[i]` occupies memory position `i`. The logical shape is
//! given by the dimension vector. Decoding reshapes the buffer with the
//! memory-order shape and transposes by the inverse permutation, yielding the
//! row-major logical array whose shape equals the dimension vector.

use crate::container::{checked_product, Array};
use crate::errors::LvArrayError;

/// Reserved child holding the dimension vector
pub const DIMENSIONS: &str = "__dimensions__";
/// Reserved child holding the permutation vector
pub const PERMUTATION: &str = "__permutation__";
/// Reserved child holding the flat value buffer
pub const VALUES: &str = "__values__";

/// The three reserved child names, in the order they are checked
pub const RESERVED: [&str; 3] = [DIMENSIONS, PERMUTATION, VALUES];

/// True iff `permutation` is a bijection on `0..permutation.len()`
pub fn is_permutation(permutation: &[i64]) -> bool {
    let mut sorted = permutation.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(i, &p)| i64::try_from(i).map_or(false, |i| i == p))
}

/// Validate shapes and contents of the metadata against a buffer of `len`
/// elements, returning the dimensions and permutation as indices.
pub fn validate(
    dimensions: &[i64],
    permutation: &[i64],
    len: usize,
) -> Result<(Vec<usize>, Vec<usize>), LvArrayError> {
    if dimensions.len() != permutation.len() {
        return Err(LvArrayError::LengthMismatch {
            dimensions: dimensions.len(),
            permutation: permutation.len(),
        });
    }

    let dims = to_indices("dimensions", dimensions)?;
    let Some(expected) = checked_product(&dims) else {
        return Err(LvArrayError::SizeOverflow { dimensions: dims });
    };
    if expected != len {
        return Err(LvArrayError::SizeMismatch {
            dimensions: dims,
            expected,
            actual: len,
        });
    }

    if !is_permutation(permutation) {
        return Err(LvArrayError::InvalidPermutation {
            permutation: permutation.to_vec(),
        });
    }
    let perm = to_indices("permutation", permutation)?;
    Ok((dims, perm))
}

fn to_indices(field: &str, values: &[i64]) -> Result<Vec<usize>, LvArrayError> {
    values
        .iter()
        .map(|&v| {
            usize::try_from(v).map_err(|_| LvArrayError::InvalidMetadata {
                field: field.to_string(),
                reason: format!("found {}", v),
            })
        })
        .collect()
}

/// Memory offset of every logical element, in row-major logical order.
///
/// `dims` and `perm` must already be validated.
fn memory_order(dims: &[usize], perm: &[usize]) -> Vec<usize> {
    let rank = dims.len();
    let total: usize = dims.iter().product();
    if total == 0 {
        return Vec::new();
    }

    let memory_shape: Vec<usize> = perm.iter().map(|&p| dims[p]).collect();
    let mut memory_strides = vec![1usize; rank];
    for i in (0..rank.saturating_sub(1)).rev() {
        memory_strides[i] = memory_strides[i + 1] * memory_shape[i + 1];
    }

    // Logical axis a lives at memory position inverse[a].
    let mut logical_strides = vec![0usize; rank];
    for (position, &axis) in perm.iter().enumerate() {
        logical_strides[axis] = memory_strides[position];
    }

    let mut order = Vec::with_capacity(total);
    let mut index = vec![0usize; rank];
    let mut offset = 0usize;
    for _ in 0..total {
        order.push(offset);
        for axis in (0..rank).rev() {
            index[axis] += 1;
            offset += logical_strides[axis];
            if index[axis] < dims[axis] {
                break;
            }
            offset -= logical_strides[axis] * dims[axis];
            index[axis] = 0;
        }
    }
    order
}

/// Decode a flat buffer into the row-major logical array
pub fn decode<T: Clone>(
    flat: &[T],
    dimensions: &[i64],
    permutation: &[i64],
) -> Result<Vec<T>, LvArrayError> {
    let (dims, perm) = validate(dimensions, permutation, flat.len())?;
    Ok(memory_order(&dims, &perm)
        .into_iter()
        .map(|m| flat[m].clone())
        .collect())
}

/// Inverse of [`decode`]: flatten a row-major logical array into memory order
pub fn encode<T: Clone>(
    logical: &[T],
    dimensions: &[i64],
    permutation: &[i64],
) -> Result<Vec<T>, LvArrayError> {
    let (dims, perm) = validate(dimensions, permutation, logical.len())?;
    let mut flat = logical.to_vec();
    for (l, m) in memory_order(&dims, &perm).into_iter().enumerate() {
        flat[m] = logical[l].clone();
    }
    Ok(flat)
}

/// Read a 1-D integer metadata array
fn metadata_vector(field: &str, array: &Array) -> Result<Vec<i64>, LvArrayError> {
    let rank = array.rank();
    if rank != 1 {
        return Err(match field {
            "dimensions" => LvArrayError::DimensionsNotVector { rank },
            _ => LvArrayError::PermutationNotVector { rank },
        });
    }
    let values = array.to_i128().ok_or_else(|| LvArrayError::InvalidMetadata {
        field: field.to_string(),
        reason: format!("dtype {} is not an integer type", array.dtype),
    })?;
    values
        .into_iter()
        .map(|v| {
            i64::try_from(v).map_err(|_| LvArrayError::InvalidMetadata {
                field: field.to_string(),
                reason: format!("{} is out of range", v),
            })
        })
        .collect()
}

/// Decode the three datasets of an LvArray triple into one logical array
pub fn decode_array(
    values: &Array,
    dimensions: &Array,
    permutation: &Array,
) -> Result<Array, LvArrayError> {
    let dims = metadata_vector("dimensions", dimensions)?;
    let perm = metadata_vector("permutation", permutation)?;
    let (dims_idx, perm_idx) = validate(&dims, &perm, values.data.len())?;
    let order = memory_order(&dims_idx, &perm_idx);
    Ok(Array::new(
        values.dtype,
        Some(dims_idx),
        values.data.gather(&order),
    ))
}
