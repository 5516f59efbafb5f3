//! Tree comparison engine.
//!
//! The core entry point is [`compare_trees`], which walks two containers in
//! lock-step and produces a [`ComparisonOutcome`]. Each step returns its own
//! findings; nothing is shared between steps.

use crate::codec::lvarray::{self, DIMENSIONS, PERMUTATION, VALUES};
use crate::config::ComparisonConfig;
use crate::container::{path_join, Array, Dataset, Group, Node};
use crate::diff::model::{ComparisonOutcome, Finding};
use crate::tolerance::compare_data;
use std::collections::{BTreeMap, BTreeSet};

/// Compare a target container against a baseline container
pub fn compare_trees(target: &Group, baseline: &Group, config: &ComparisonConfig) -> ComparisonOutcome {
    compare_groups("/", target, baseline, config).into_iter().collect()
}

/// Compare two attribute sets owned by the object at `path`
pub fn compare_attributes(
    path: &str,
    attrs: &BTreeMap<String, Array>,
    base_attrs: &BTreeMap<String, Array>,
    config: &ComparisonConfig,
) -> Vec<Finding> {
    let names: BTreeSet<&String> = attrs.keys().chain(base_attrs.keys()).collect();
    let mut findings = Vec::new();

    for name in names {
        let attr_path = format!("{}.attrs[{}]", path, name);
        if config.exclusions.is_excluded(&attr_path) {
            continue;
        }
        match (attrs.get(name), base_attrs.get(name)) {
            (None, Some(_)) => {
                if !config.skip_missing {
                    findings.push(Finding::error(
                        path,
                        format!(
                            "Attribute {} is in the baseline file but not the file to compare.",
                            name
                        ),
                    ));
                }
            }
            (Some(_), None) => findings.push(
                Finding::warning(
                    path,
                    format!(
                        "Attribute {} is in the file to compare but not the baseline file.",
                        name
                    ),
                )
                .promoted(config.warnings_are_errors),
            ),
            (Some(a), Some(b)) => findings.extend(compare_data(&attr_path, a, b, config)),
            (None, None) => {}
        }
    }
    findings
}

fn compare_datasets(
    path: &str,
    dataset: &Dataset,
    base_dataset: &Dataset,
    config: &ComparisonConfig,
) -> Vec<Finding> {
    let mut findings = compare_attributes(path, &dataset.attrs, &base_dataset.attrs, config);
    findings.extend(compare_data(path, &dataset.value, &base_dataset.value, config));
    findings
}

/// The `(dimensions, permutation, values)` arrays of a group, if it holds an
/// LvArray triple none of whose members is excluded
fn lvarray_triple<'a>(
    path: &str,
    group: &'a Group,
    config: &ComparisonConfig,
) -> Option<(&'a Array, &'a Array, &'a Array)> {
    let excluded = |name: &str| config.exclusions.is_excluded(&path_join(path, name));
    if lvarray::RESERVED.iter().any(|name| excluded(*name)) {
        return None;
    }
    Some((
        &group.dataset(DIMENSIONS)?.value,
        &group.dataset(PERMUTATION)?.value,
        &group.dataset(VALUES)?.value,
    ))
}

fn compare_lvarrays(
    path: &str,
    (dims, perm, values): (&Array, &Array, &Array),
    (base_dims, base_perm, base_values): (&Array, &Array, &Array),
    config: &ComparisonConfig,
) -> Vec<Finding> {
    let (decoded, base_decoded) = match (
        lvarray::decode_array(values, dims, perm),
        lvarray::decode_array(base_values, base_dims, base_perm),
    ) {
        (Ok(a), Ok(b)) => (a, b),
        (target, baseline) => {
            let mut findings = Vec::new();
            if let Err(e) = target {
                findings.push(Finding::error(
                    path,
                    format!("Failed to permute the LvArray: {}", e),
                ));
            }
            if let Err(e) = baseline {
                findings.push(Finding::error(
                    path,
                    format!("Failed to permute the baseline LvArray: {}", e),
                ));
            }
            return findings;
        }
    };

    if decoded.shape != base_decoded.shape {
        return vec![Finding::error(
            path,
            format!(
                "Cannot compare LvArrays because they have different dimensions. Dimensions = {}, base dimensions = {}",
                decoded.shape_label(),
                base_decoded.shape_label()
            ),
        )];
    }
    compare_data(path, &decoded, &base_decoded, config)
}

/// Compare two groups at `path`: attributes, then an LvArray triple, then the
/// remaining children in name order
pub fn compare_groups(
    path: &str,
    group: &Group,
    base_group: &Group,
    config: &ComparisonConfig,
) -> Vec<Finding> {
    let mut findings = compare_attributes(path, &group.attrs, &base_group.attrs, config);

    let mut names: BTreeSet<&str> = group
        .children
        .keys()
        .chain(base_group.children.keys())
        .map(String::as_str)
        .collect();

    if let (Some(triple), Some(base_triple)) = (
        lvarray_triple(path, group, config),
        lvarray_triple(path, base_group, config),
    ) {
        for name in lvarray::RESERVED {
            names.remove(name);
        }
        findings.extend(compare_lvarrays(path, triple, base_triple, config));
    }

    for name in names {
        let child_path = path_join(path, name);
        if config.exclusions.is_excluded(&child_path) {
            continue;
        }

        match (group.get(name), base_group.get(name)) {
            (None, Some(_)) => {
                if !config.skip_missing {
                    findings.push(Finding::error(
                        path,
                        format!(
                            "Group has a child '{}' in the baseline file but not the file to compare.",
                            name
                        ),
                    ));
                }
            }
            (Some(_), None) => findings.push(
                Finding::warning(
                    path,
                    format!(
                        "Group has a child '{}' in the file to compare but not the baseline file.",
                        name
                    ),
                )
                .promoted(config.warnings_are_errors),
            ),
            (Some(Node::Group(g)), Some(Node::Group(bg))) => {
                findings.extend(compare_groups(&child_path, g, bg, config));
            }
            (Some(Node::Dataset(d)), Some(Node::Dataset(bd))) => {
                findings.extend(compare_datasets(&child_path, d, bd, config));
            }
            (Some(Node::ExternalLink(_)), Some(Node::ExternalLink(_))) => findings.push(
                Finding::warning(path, format!("Child {} has unknown type: ExternalLink.", name))
                    .promoted(config.warnings_are_errors),
            ),
            (Some(a), Some(b)) => findings.push(Finding::error(
                path,
                format!(
                    "Child {} has differing types in the file to compare and the baseline: {}, {}.",
                    name,
                    a.kind_name(),
                    b.kind_name()
                ),
            )),
            (None, None) => {}
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExclusionSet, Tolerance};
    use crate::container::ExternalLink;
    use crate::diff::model::Severity;

    fn lvarray_group(values: Vec<f64>, dims: Vec<i64>, perm: Vec<i64>) -> Group {
        Group::new()
            .with_dataset(DIMENSIONS, Array::i64s(dims))
            .with_dataset(PERMUTATION, Array::i64s(perm))
            .with_dataset(VALUES, Array::f64s(values))
    }

    #[test]
    fn test_identical_trees_have_no_findings() {
        let tree = Group::new()
            .with_attr("step", Array::scalar_i64(10))
            .with_child("mesh", Group::new().with_dataset("x", Array::f64s(vec![1.0, 2.0])));
        let outcome = compare_trees(&tree, &tree, &ComparisonConfig::default());
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_missing_children_both_directions() {
        let target = Group::new().with_dataset("extra", Array::scalar_f64(1.0));
        let baseline = Group::new().with_dataset("gone", Array::scalar_f64(1.0));
        let outcome = compare_trees(&target, &baseline, &ComparisonConfig::default());
        assert_eq!(outcome.findings.len(), 2);
        assert_eq!(outcome.findings[0].path, "/");
        assert!(outcome.findings[0].message.contains("'extra' in the file to compare"));
        assert_eq!(outcome.findings[0].severity, Severity::Warning);
        assert!(outcome.findings[1].message.contains("'gone' in the baseline file"));
        assert_eq!(outcome.findings[1].severity, Severity::Error);
    }

    #[test]
    fn test_skip_missing_silences_baseline_only() {
        let target = Group::new();
        let baseline = Group::new()
            .with_attr("a", Array::scalar_i64(1))
            .with_dataset("gone", Array::scalar_f64(1.0));
        let cfg = ComparisonConfig::default().with_skip_missing(true);
        assert!(compare_trees(&target, &baseline, &cfg).is_empty());
    }

    #[test]
    fn test_kind_mismatch_stops_descent() {
        let target = Group::new().with_child("x", Group::new().with_dataset("y", Array::scalar_f64(1.0)));
        let baseline = Group::new().with_dataset("x", Array::scalar_f64(1.0));
        let outcome = compare_trees(&target, &baseline, &ComparisonConfig::default());
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(
            outcome.findings[0].message,
            "Child x has differing types in the file to compare and the baseline: Group, Dataset."
        );
    }

    #[test]
    fn test_excluded_paths_are_never_visited() {
        let target = Group::new().with_child(
            "Problem",
            Group::new()
                .with_dataset("commandLine", Array::string("a"))
                .with_attr("schema", Array::string("x")),
        );
        let baseline = Group::new().with_child(
            "Problem",
            Group::new()
                .with_dataset("commandLine", Array::string("b"))
                .with_attr("schema", Array::string("y")),
        );
        let cfg = ComparisonConfig::new(
            Tolerance::exact(),
            ExclusionSet::new([".*/commandLine", r".*\.attrs\[schema\]"]).unwrap(),
        );
        assert!(compare_trees(&target, &baseline, &cfg).is_empty());
    }

    #[test]
    fn test_attribute_paths() {
        let target = Group::new().with_dataset(
            "d",
            Array::f64s(vec![1.0]),
        );
        let target = target.with_child(
            "e",
            Dataset::new(Array::f64s(vec![1.0])).with_attr("units", Array::string("m")),
        );
        let baseline = Group::new().with_dataset("d", Array::f64s(vec![1.0])).with_child(
            "e",
            Dataset::new(Array::f64s(vec![1.0])).with_attr("units", Array::string("cm")),
        );
        let outcome = compare_trees(&target, &baseline, &ComparisonConfig::default());
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].path, "/e.attrs[units]");
    }

    #[test]
    fn test_lvarray_compared_in_logical_order() {
        let target = Group::new().with_child(
            "field",
            lvarray_group(vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0], vec![2, 3], vec![1, 0]),
        );
        let baseline = Group::new().with_child(
            "field",
            lvarray_group(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], vec![2, 3], vec![0, 1]),
        );
        let outcome = compare_trees(&target, &baseline, &ComparisonConfig::default());
        assert!(outcome.is_empty(), "{:?}", outcome);
    }

    #[test]
    fn test_lvarray_dimension_mismatch() {
        let target = lvarray_group(vec![0.0; 6], vec![2, 3], vec![0, 1]);
        let baseline = lvarray_group(vec![0.0; 6], vec![3, 2], vec![0, 1]);
        let outcome = compare_trees(&target, &baseline, &ComparisonConfig::default());
        assert_eq!(outcome.findings.len(), 1);
        assert!(outcome.findings[0]
            .message
            .starts_with("Cannot compare LvArrays because they have different dimensions"));
    }

    #[test]
    fn test_invalid_lvarray_is_reported_on_group_path() {
        let target = Group::new().with_child("f", lvarray_group(vec![0.0; 6], vec![2, 3], vec![0, 0]));
        let baseline = Group::new().with_child("f", lvarray_group(vec![0.0; 6], vec![2, 3], vec![0, 1]));
        let outcome = compare_trees(&target, &baseline, &ComparisonConfig::default());
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].path, "/f");
        assert!(outcome.findings[0].message.starts_with("Failed to permute the LvArray"));
    }

    #[test]
    fn test_each_invalid_lvarray_side_is_reported() {
        let target = Group::new().with_child("f", lvarray_group(vec![0.0; 6], vec![2, 3], vec![1, 1]));
        let baseline = Group::new().with_child("f", lvarray_group(vec![0.0; 5], vec![2, 3], vec![0, 1]));
        let outcome = compare_trees(&target, &baseline, &ComparisonConfig::default());
        let messages: Vec<&str> = outcome.findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages.len(), 2, "{:?}", messages);
        assert!(messages[0].starts_with("Failed to permute the LvArray: The permutation is not valid"));
        assert!(messages[1].starts_with("Failed to permute the baseline LvArray: The shape is [2, 3]"));
        assert!(outcome.findings.iter().all(|f| f.path == "/f"));
    }

    #[test]
    fn test_external_links_warn() {
        let link = ExternalLink {
            file: "a.json".into(),
            path: "/x".into(),
        };
        let tree = Group::new().with_child("l", link);
        let outcome = compare_trees(&tree, &tree, &ComparisonConfig::default());
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].severity, Severity::Warning);
        assert!(!outcome.differs());
    }
}
