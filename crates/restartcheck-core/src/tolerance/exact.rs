//! Exact law: elementwise equality, used for integers and zero tolerance.

/// Statistics over the nonzero absolute differences
#[derive(Debug, Clone, PartialEq)]
pub struct ExactStats {
    pub len: usize,
    pub offenders: usize,
    pub max_index: usize,
    pub max_difference: f64,
    pub mean: f64,
    pub std: f64,
}

impl ExactStats {
    pub fn fails(&self) -> bool {
        self.offenders > 0
    }

    fn from_differences(differences: Vec<f64>) -> Self {
        let mut max_index = 0;
        let mut max_difference = 0.0;
        for (i, &d) in differences.iter().enumerate() {
            if d > max_difference {
                max_index = i;
                max_difference = d;
            }
        }

        let nonzero: Vec<f64> = differences.iter().copied().filter(|&d| d != 0.0).collect();
        let (mean, std) = if nonzero.is_empty() {
            (0.0, 0.0)
        } else {
            let n = nonzero.len() as f64;
            let mean = nonzero.iter().sum::<f64>() / n;
            let variance = nonzero.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
            (mean, variance.sqrt())
        };

        Self {
            len: differences.len(),
            offenders: nonzero.len(),
            max_index,
            max_difference,
            mean,
            std,
        }
    }
}

/// Exact comparison of integer buffers
pub fn exact_stats_int(target: &[i128], baseline: &[i128]) -> ExactStats {
    ExactStats::from_differences(
        target
            .iter()
            .zip(baseline)
            .map(|(&x, &b)| (x - b).unsigned_abs() as f64)
            .collect(),
    )
}

/// Exact comparison of float buffers; both-NaN counts as equal
pub fn exact_stats_float(target: &[f64], baseline: &[f64]) -> ExactStats {
    ExactStats::from_differences(
        target
            .iter()
            .zip(baseline)
            .map(|(&x, &b)| {
                if x == b || (x.is_nan() && b.is_nan()) {
                    0.0
                } else {
                    let d = (x - b).abs();
                    if d.is_nan() {
                        f64::INFINITY
                    } else {
                        d
                    }
                }
            })
            .collect(),
    )
}
