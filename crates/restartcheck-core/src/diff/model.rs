//! Comparison output types.
//!
//! Findings are immutable values: each comparison step returns the findings it
//! produced and the caller appends them in walk order.

use serde::{Deserialize, Serialize};

/// Severity of a finding. Only errors make a pair differ.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// One reportable difference at a container path.
///
/// `message` may span several lines and carries no trailing newline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub path: String,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Reclassify a warning as an error when `warnings_are_errors` is set
    pub fn promoted(mut self, warnings_are_errors: bool) -> Self {
        if warnings_are_errors {
            self.severity = Severity::Error;
        }
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Ordered findings for one file pair
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComparisonOutcome {
    pub findings: Vec<Finding>,
}

impl ComparisonOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    /// True iff at least one finding is an error
    pub fn differs(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings.len() - self.error_count()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

impl FromIterator<Finding> for ComparisonOutcome {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        Self {
            findings: iter.into_iter().collect(),
        }
    }
}
