//! Float law: dual absolute / relative tolerance with q-scaling.
//!
//! A value `x` is accepted against baseline `b` iff `|x-b| <= atol` or
//! `|x-b| <= rtol*|b|`. The scaling factor `q` measures how far past tolerance
//! an element is; an array fails iff `max(q) > 1`.

use crate::config::Tolerance;

/// Guard added to `|b|` when the relative tolerance alone is in force
pub const RELATIVE_GUARD: f64 = 1e-20;

/// Which tolerance bounds an element's q value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Absolute,
    Relative,
}

/// Pick the limiting tolerance for baseline value `b`.
///
/// The tie `rtol*|b| == atol` is absolute-limited.
pub fn limit_for(b: f64, tol: &Tolerance) -> Limit {
    if tol.relative() == 0.0 {
        Limit::Absolute
    } else if tol.absolute() == 0.0 || tol.relative() * b.abs() > tol.absolute() {
        Limit::Relative
    } else {
        Limit::Absolute
    }
}

/// Scaling factor for one element.
///
/// Equal values (equal infinities and both-NaN included) give 0; exactly one
/// NaN gives +inf. Zero tolerance gives +inf for any other difference, and
/// so does a finite value against an infinite baseline.
pub fn element_q(x: f64, b: f64, tol: &Tolerance) -> f64 {
    if x == b || (x.is_nan() && b.is_nan()) {
        return 0.0;
    }
    if x.is_nan() || b.is_nan() || tol.is_exact() {
        return f64::INFINITY;
    }

    let diff = (x - b).abs();
    let q = match limit_for(b, tol) {
        Limit::Absolute => diff / tol.absolute(),
        Limit::Relative if tol.absolute() == 0.0 => {
            diff / (tol.relative() * (b.abs() + RELATIVE_GUARD))
        }
        Limit::Relative => diff / (tol.relative() * b.abs()),
    };
    // inf / inf against an infinite baseline
    if q.is_nan() { f64::INFINITY } else { q }
}

/// Statistics over the offenders bounded by one tolerance
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetStats {
    pub count: usize,
    pub max: f64,
    pub max_index: usize,
    pub mean: f64,
    pub std: f64,
}

/// Result of applying the float law to two equally-sized buffers
#[derive(Debug, Clone, PartialEq)]
pub struct QStats {
    pub len: usize,
    pub offenders: usize,
    pub max_q: f64,
    pub max_q_index: usize,
    pub max_absolute_index: usize,
    pub max_relative_index: usize,
    pub absolute: Option<SubsetStats>,
    pub relative: Option<SubsetStats>,
}

impl QStats {
    pub fn fails(&self) -> bool {
        self.max_q > 1.0
    }
}

/// Index of the first maximum; NaN counts as +inf
fn argmax(values: impl Iterator<Item = f64>) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, v) in values.enumerate() {
        let v = if v.is_nan() { f64::INFINITY } else { v };
        if v > best.1 {
            best = (i, v);
        }
    }
    best
}

fn subset_stats(qs: &[(usize, f64)]) -> Option<SubsetStats> {
    if qs.is_empty() {
        return None;
    }
    let (pos, max) = argmax(qs.iter().map(|&(_, q)| q));
    let n = qs.len() as f64;
    let mean = qs.iter().map(|&(_, q)| q).sum::<f64>() / n;
    let variance = qs.iter().map(|&(_, q)| (q - mean).powi(2)).sum::<f64>() / n;
    Some(SubsetStats {
        count: qs.len(),
        max,
        max_index: qs[pos].0,
        mean,
        std: variance.sqrt(),
    })
}

/// Apply the float law elementwise. Both slices must have the same length.
pub fn float_q_stats(target: &[f64], baseline: &[f64], tol: &Tolerance) -> QStats {
    let pairs = || target.iter().copied().zip(baseline.iter().copied());

    let qs: Vec<f64> = pairs().map(|(x, b)| element_q(x, b, tol)).collect();
    let (max_q_index, max_q) = argmax(qs.iter().copied());
    let max_q = if qs.is_empty() { 0.0 } else { max_q };

    let (max_absolute_index, _) = argmax(pairs().map(|(x, b)| {
        if x == b { 0.0 } else { (x - b).abs() }
    }));
    let (max_relative_index, _) = argmax(pairs().map(|(x, b)| {
        if x == b { 0.0 } else { (x - b).abs() / (b.abs() + RELATIVE_GUARD) }
    }));

    let mut absolute = Vec::new();
    let mut relative = Vec::new();
    for (i, (&q, &b)) in qs.iter().zip(baseline).enumerate() {
        if q > 1.0 {
            match limit_for(b, tol) {
                Limit::Absolute => absolute.push((i, q)),
                Limit::Relative => relative.push((i, q)),
            }
        }
    }

    QStats {
        len: qs.len(),
        offenders: absolute.len() + relative.len(),
        max_q,
        max_q_index,
        max_absolute_index,
        max_relative_index,
        absolute: subset_stats(&absolute),
        relative: subset_stats(&relative),
    }
}
