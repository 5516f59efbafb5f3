use restartcheck_core::codec::{DIMENSIONS, PERMUTATION, VALUES};
use restartcheck_core::container::{Array, Dataset, Group};

/// A small restart-like tree: a problem group with a mesh, a field stored as
/// an LvArray, and a couple of bookkeeping entries
#[allow(dead_code)]
pub fn restart_tree(pressure: Vec<f64>) -> Group {
    Group::new().with_child(
        "Problem",
        Group::new()
            .with_attr("cycle", Array::scalar_i64(120))
            .with_dataset("commandLine", Array::string("geos -i input.xml"))
            .with_child(
                "mesh",
                Group::new()
                    .with_dataset("nodes", Array::i64s(vec![0, 1, 2, 3]))
                    .with_child(
                        "pressure",
                        Dataset::new(Array::f64s(pressure)).with_attr("units", Array::string("Pa")),
                    ),
            )
            .with_child("displacement", lvarray(vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0], vec![2, 3], vec![1, 0])),
    )
}

/// An LvArray group
#[allow(dead_code)]
pub fn lvarray(values: Vec<f64>, dims: Vec<i64>, perm: Vec<i64>) -> Group {
    Group::new()
        .with_dataset(DIMENSIONS, Array::i64s(dims))
        .with_dataset(PERMUTATION, Array::i64s(perm))
        .with_dataset(VALUES, Array::f64s(values))
}
