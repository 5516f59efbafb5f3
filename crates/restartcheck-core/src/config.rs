//! Comparison configuration
//!
//! One immutable [`ComparisonConfig`] is built per invocation and passed by
//! reference to every comparison.

use crate::errors::{ExError, ExErrorKind, Result};
use regex::Regex;

/// Default relative tolerance
pub const RTOL_DEFAULT: f64 = 0.0;

/// Default absolute tolerance
pub const ATOL_DEFAULT: f64 = 0.0;

/// Paths excluded by default: environment-specific or schema-version fields
pub const EXCLUDE_DEFAULT: &[&str] = &[
    ".*/commandLine",
    ".*/schema$",
    ".*/globalToLocalMap",
    ".*/timeHistoryOutput.*/restart",
];

/// Absolute / relative tolerance pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    absolute: f64,
    relative: f64,
}

impl Tolerance {
    /// Create a tolerance; both components must be finite and non-negative
    pub fn new(absolute: f64, relative: f64) -> Result<Self> {
        for (name, value) in [("absolute", absolute), ("relative", relative)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ExError::new(ExErrorKind::InvalidTolerance)
                    .with_op("tolerance_new")
                    .with_message(format!(
                        "{} tolerance must be a finite value >= 0.0, got {}",
                        name, value
                    )));
            }
        }
        Ok(Self { absolute, relative })
    }

    /// Zero tolerance: exact comparison
    pub fn exact() -> Self {
        Self {
            absolute: 0.0,
            relative: 0.0,
        }
    }

    pub fn absolute(&self) -> f64 {
        self.absolute
    }

    pub fn relative(&self) -> f64 {
        self.relative
    }

    /// True when both components are zero
    pub fn is_exact(&self) -> bool {
        self.absolute == 0.0 && self.relative == 0.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            absolute: ATOL_DEFAULT,
            relative: RTOL_DEFAULT,
        }
    }
}

/// Ordered list of path-exclusion regexes
///
/// A pattern matches when it matches at the start of the path.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    sources: Vec<String>,
    compiled: Vec<Regex>,
}

impl ExclusionSet {
    /// Compile patterns in order
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for pattern in patterns {
            set.push(pattern.as_ref())?;
        }
        Ok(set)
    }

    /// The default exclusions
    pub fn defaults() -> Result<Self> {
        Self::new(EXCLUDE_DEFAULT.iter().copied())
    }

    /// Append one pattern
    pub fn push(&mut self, pattern: &str) -> Result<()> {
        let anchored = format!("^(?:{})", pattern);
        let regex = Regex::new(&anchored).map_err(|e| {
            ExError::new(ExErrorKind::InvalidPattern)
                .with_op("exclusion_compile")
                .with_message(format!("invalid exclusion pattern '{}': {}", pattern, e))
        })?;
        self.sources.push(pattern.to_string());
        self.compiled.push(regex);
        Ok(())
    }

    /// True iff `path` matches any pattern
    pub fn is_excluded(&self, path: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(path))
    }

    /// Patterns as given, in order
    pub fn patterns(&self) -> &[String] {
        &self.sources
    }
}

/// Everything a comparison needs besides the two containers
#[derive(Debug, Clone, Default)]
pub struct ComparisonConfig {
    pub tolerance: Tolerance,
    pub exclusions: ExclusionSet,
    /// Silently accept fields that exist only in the baseline
    pub skip_missing: bool,
    /// Reclassify every warning as an error
    pub warnings_are_errors: bool,
}

impl ComparisonConfig {
    pub fn new(tolerance: Tolerance, exclusions: ExclusionSet) -> Self {
        Self {
            tolerance,
            exclusions,
            skip_missing: false,
            warnings_are_errors: false,
        }
    }

    pub fn with_skip_missing(mut self, skip_missing: bool) -> Self {
        self.skip_missing = skip_missing;
        self
    }

    pub fn with_warnings_are_errors(mut self, warnings_are_errors: bool) -> Self {
        self.warnings_are_errors = warnings_are_errors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_tolerance_rejected() {
        let err = Tolerance::new(-1.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidTolerance);
        assert!(Tolerance::new(0.0, -0.1).is_err());
        assert!(Tolerance::new(f64::NAN, 0.0).is_err());
        assert!(Tolerance::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_exact_tolerance() {
        assert!(Tolerance::exact().is_exact());
        assert!(Tolerance::default().is_exact());
        assert!(!Tolerance::new(1e-12, 0.0).unwrap().is_exact());
    }

    #[test]
    fn test_exclusion_anchored_at_start() {
        let set = ExclusionSet::new(["/problem/mesh"]).unwrap();
        assert!(set.is_excluded("/problem/mesh"));
        assert!(set.is_excluded("/problem/mesh/nodes"));
        assert!(!set.is_excluded("/other/problem/mesh"));
    }

    #[test]
    fn test_default_exclusions() {
        let set = ExclusionSet::defaults().unwrap();
        assert!(set.is_excluded("/Problem/commandLine"));
        assert!(set.is_excluded("/Problem/schema"));
        assert!(!set.is_excluded("/Problem/schemaVersion"));
        assert!(set.is_excluded("/a/timeHistoryOutput1/restart"));
        assert_eq!(set.patterns().len(), EXCLUDE_DEFAULT.len());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = ExclusionSet::new(["("]).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidPattern);
    }
}
