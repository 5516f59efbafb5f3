//! Tolerance evaluator
//!
//! [`compare_data`] compares the values of two arrays at one path and returns
//! the findings. The law is chosen from the element kinds of both sides:
//!
//! - both integer: exact law
//! - otherwise both numeric: float law (exact law under zero tolerance)
//! - both string: string law
//! - anything else: "Unrecognized type combination" warning

pub mod exact;
pub mod float;

use crate::config::ComparisonConfig;
use crate::container::{format_index, unravel_index, Array, ElementKind};
use crate::diff::model::Finding;

pub use exact::{exact_stats_float, exact_stats_int, ExactStats};
pub use float::{element_q, float_q_stats, Limit, QStats, SubsetStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Law {
    Exact,
    Float,
    String,
}

fn pick_law(target: &Array, baseline: &Array) -> Option<Law> {
    let (t, b) = (target.dtype.kind(), baseline.dtype.kind());
    match (t, b) {
        (ElementKind::Integer, ElementKind::Integer) => Some(Law::Exact),
        _ if t.is_numeric() && b.is_numeric() => Some(Law::Float),
        (ElementKind::String, ElementKind::String) => Some(Law::String),
        _ => None,
    }
}

/// Compare the data of two arrays at `path`
pub fn compare_data(
    path: &str,
    target: &Array,
    baseline: &Array,
    config: &ComparisonConfig,
) -> Vec<Finding> {
    let werror = config.warnings_are_errors;
    let mut findings = Vec::new();

    if target.dtype != baseline.dtype {
        findings.push(
            Finding::warning(
                path,
                format!(
                    "Datasets have different types: {}, {}.",
                    target.dtype, baseline.dtype
                ),
            )
            .promoted(werror),
        );
    }

    match (target.is_empty(), baseline.is_empty()) {
        (true, true) => return findings,
        (true, false) => {
            findings.push(Finding::error(
                path,
                "File to compare has an empty dataset where the baseline's dataset is not empty.",
            ));
            return findings;
        }
        (false, true) => {
            findings.push(
                Finding::warning(
                    path,
                    "Baseline has an empty dataset where the file to compare's dataset is not empty.",
                )
                .promoted(werror),
            );
            return findings;
        }
        (false, false) => {}
    }

    let Some(law) = pick_law(target, baseline) else {
        findings.push(
            Finding::warning(
                path,
                format!(
                    "Unrecognized type combination: {} {}.",
                    target.dtype, baseline.dtype
                ),
            )
            .promoted(werror),
        );
        return findings;
    };

    if target.size() == 1 && baseline.size() == 1 {
        if scalars_differ(law, target, baseline, config) {
            findings.push(Finding::error(
                path,
                format!(
                    "Scalar values of types {} and {} differ: {}, {}.",
                    target.dtype,
                    baseline.dtype,
                    target.element_label(0),
                    baseline.element_label(0)
                ),
            ));
        }
        return findings;
    }

    if law != Law::String && target.shape != baseline.shape {
        findings.push(Finding::error(
            path,
            format!(
                "Datasets have different shapes and therefore can't be compared: {}, {}.",
                target.shape_label(),
                baseline.shape_label()
            ),
        ));
        return findings;
    }

    let message = match law {
        Law::Exact => exact_message(target, baseline),
        Law::Float if config.tolerance.is_exact() => exact_message(target, baseline),
        Law::Float => float_message(target, baseline, config),
        Law::String => string_message(target, baseline),
    };
    findings.extend(message.map(|m| Finding::error(path, m)));
    findings
}

fn scalars_differ(law: Law, target: &Array, baseline: &Array, config: &ComparisonConfig) -> bool {
    match law {
        Law::Exact => target.to_i128() != baseline.to_i128(),
        Law::Float => match (target.to_f64(), baseline.to_f64()) {
            (Some(t), Some(b)) => element_q(t[0], b[0], &config.tolerance) > 1.0,
            _ => true,
        },
        Law::String => target.as_strs() != baseline.as_strs(),
    }
}

fn index_label(array: &Array, flat: usize) -> String {
    let shape = array.shape.as_deref().unwrap_or(&[]);
    format_index(&unravel_index(flat, shape))
}

fn exact_message(target: &Array, baseline: &Array) -> Option<String> {
    let stats = match (target.to_i128(), baseline.to_i128()) {
        (Some(t), Some(b)) => exact_stats_int(&t, &b),
        _ => match (target.to_f64(), baseline.to_f64()) {
            (Some(t), Some(b)) => exact_stats_float(&t, &b),
            _ => return None,
        },
    };
    if !stats.fails() {
        return None;
    }
    Some(format!(
        "Arrays of types {} and {} have {} values of which {} have differing values.\n\
         Statistics of the differences greater than 0:\n\
         \tmax_index = {}, max = {}, mean = {}, std = {}",
        target.dtype,
        baseline.dtype,
        stats.len,
        stats.offenders,
        index_label(target, stats.max_index),
        stats.max_difference,
        stats.mean,
        stats.std
    ))
}

fn float_message(target: &Array, baseline: &Array, config: &ComparisonConfig) -> Option<String> {
    let (t, b) = (target.to_f64()?, baseline.to_f64()?);
    let stats = float_q_stats(&t, &b, &config.tolerance);
    if !stats.fails() {
        return None;
    }

    let at = |i: usize| {
        format!(
            "index {}, value = {}, base_value = {}",
            index_label(target, i),
            target.element_label(i),
            baseline.element_label(i)
        )
    };

    let mut lines = vec![
        format!(
            "Arrays of types {} and {} have {} values of which {} fail both the relative and absolute tests.",
            target.dtype, baseline.dtype, stats.len, stats.offenders
        ),
        format!("\tMax absolute difference is at {}", at(stats.max_absolute_index)),
        format!("\tMax relative difference is at {}", at(stats.max_relative_index)),
    ];
    for (label, subset) in [("absolute", &stats.absolute), ("relative", &stats.relative)] {
        lines.push(format!(
            "Statistics of the q values greater than 1.0 defined by {} tolerance: N = {}",
            label,
            subset.as_ref().map_or(0, |s| s.count)
        ));
        if let Some(s) = subset {
            lines.push(format!("\tmax = {}, mean = {}, std = {}", s.max, s.mean, s.std));
            lines.push(format!("\tmax is at {}", at(s.max_index)));
        }
    }
    Some(lines.join("\n"))
}

fn string_message(target: &Array, baseline: &Array) -> Option<String> {
    let (t, b) = (target.as_strs()?, baseline.as_strs()?);
    if target.shape == baseline.shape && t == b {
        return None;
    }
    Some(format!(
        "String arrays differ.\nString to compare: {}\nBaseline string  : {}",
        t.concat(),
        b.concat()
    ))
}
