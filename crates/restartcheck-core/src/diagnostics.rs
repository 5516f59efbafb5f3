//! Diagnostics sink
//!
//! Renders findings to a text stream in framed blocks and, optionally,
//! collects every error into a [`DiffContainer`] that links the offending path
//! in both files.

use crate::container::{Array, Dataset, ExternalLink, Group, Node};
use crate::diff::model::{ComparisonOutcome, Finding, Severity};
use crate::errors::{ExError, ExErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

const RULE_WIDTH: usize = 80;

/// One error recorded in a diff container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub key: String,
    pub path: String,
    pub message: String,
}

/// Companion diff output for one file pair
#[derive(Debug, Clone, PartialEq)]
pub struct DiffContainer {
    identifier: String,
    target_file: String,
    baseline_file: String,
    records: BTreeMap<String, DiffRecord>,
}

impl DiffContainer {
    /// `identifier` prefixes every key, normally the target file's basename
    pub fn new(
        identifier: impl Into<String>,
        target_file: impl Into<String>,
        baseline_file: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            target_file: target_file.into(),
            baseline_file: baseline_file.into(),
            records: BTreeMap::new(),
        }
    }

    /// Add a record at `path`; a second record under the same key appends
    pub fn add(&mut self, path: &str, message: &str) {
        let key = format!("{}/{}", self.identifier, path);
        self.records
            .entry(key.clone())
            .and_modify(|r| {
                r.message.push('\n');
                r.message.push_str(message);
            })
            .or_insert_with(|| DiffRecord {
                key,
                path: path.to_string(),
                message: message.to_string(),
            });
    }

    pub fn records(&self) -> impl Iterator<Item = &DiffRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build the container tree: one nested group per key component, each
    /// record group holding `message`, `run` and `baseline`.
    pub fn to_group(&self) -> Group {
        let mut root = Group::new();
        for record in self.records.values() {
            let components: Vec<&str> = record.key.split('/').filter(|c| !c.is_empty()).collect();
            let Some(group) = group_at(&mut root, &components) else {
                tracing::warn!(
                    key = %record.key,
                    "diff record collides with an existing dataset, skipped"
                );
                continue;
            };
            group.children.insert(
                "message".to_string(),
                Dataset::new(Array::string(record.message.clone())).into(),
            );
            group.children.insert(
                "run".to_string(),
                Node::ExternalLink(ExternalLink {
                    file: self.target_file.clone(),
                    path: record.path.clone(),
                }),
            );
            group.children.insert(
                "baseline".to_string(),
                Node::ExternalLink(ExternalLink {
                    file: self.baseline_file.clone(),
                    path: record.path.clone(),
                }),
            );
        }
        root
    }
}

fn group_at<'a>(root: &'a mut Group, components: &[&str]) -> Option<&'a mut Group> {
    let mut current = root;
    for component in components {
        current = match current
            .children
            .entry((*component).to_string())
            .or_insert_with(|| Node::Group(Group::new()))
        {
            Node::Group(g) => g,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes framed findings to `W`
pub struct DiagnosticsSink<W: Write> {
    writer: W,
    warnings_are_errors: bool,
    diff: Option<DiffContainer>,
    errors: usize,
    warnings: usize,
}

impl<W: Write> DiagnosticsSink<W> {
    pub fn new(writer: W, warnings_are_errors: bool) -> Self {
        Self {
            writer,
            warnings_are_errors,
            diff: None,
            errors: 0,
            warnings: 0,
        }
    }

    /// Attach a diff container that receives every recorded error
    pub fn with_diff(mut self, diff: DiffContainer) -> Self {
        self.diff = Some(diff);
        self
    }

    /// Write a line of free text
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{}", text).map_err(write_error)
    }

    fn write_block(&mut self, label: &str, path: &str, message: &str) -> Result<()> {
        let rule = "*".repeat(RULE_WIDTH);
        let mut block = format!("{}\n{}: {}\n", rule, label, path);
        for line in message.lines() {
            block.push('\t');
            block.push_str(line);
            block.push('\n');
        }
        block.push_str(&rule);
        block.push('\n');
        self.writer.write_all(block.as_bytes()).map_err(write_error)
    }

    pub fn record_error(&mut self, path: &str, message: &str) -> Result<()> {
        self.errors += 1;
        if let Some(diff) = self.diff.as_mut() {
            diff.add(path, message);
        }
        self.write_block(Severity::Error.label(), path, message)
    }

    /// Delegates to [`Self::record_error`] when warnings are errors
    pub fn record_warning(&mut self, path: &str, message: &str) -> Result<()> {
        if self.warnings_are_errors {
            return self.record_error(path, message);
        }
        self.warnings += 1;
        self.write_block(Severity::Warning.label(), path, message)
    }

    pub fn record(&mut self, finding: &Finding) -> Result<()> {
        match finding.severity {
            Severity::Error => self.record_error(&finding.path, &finding.message),
            Severity::Warning => self.record_warning(&finding.path, &finding.message),
        }
    }

    /// Record every finding in order
    pub fn record_outcome(&mut self, outcome: &ComparisonOutcome) -> Result<()> {
        outcome.findings.iter().try_for_each(|f| self.record(f))
    }

    /// True once any error has been recorded
    pub fn differs(&self) -> bool {
        self.errors > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(write_error)
    }

    /// Consume the sink, returning the writer and the diff container
    pub fn into_parts(self) -> (W, Option<DiffContainer>) {
        (self.writer, self.diff)
    }
}

fn write_error(err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op("diagnostics_write")
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> String {
        "*".repeat(80)
    }

    #[test]
    fn test_error_block_framing() {
        let mut sink = DiagnosticsSink::new(Vec::new(), false);
        sink.record_error("/a/b", "first line\nsecond line").unwrap();
        let (out, _) = sink.into_parts();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            format!("{r}\nError: /a/b\n\tfirst line\n\tsecond line\n{r}\n", r = rule())
        );
    }

    #[test]
    fn test_warning_delegates_when_promoted() {
        let mut sink = DiagnosticsSink::new(Vec::new(), true);
        sink.record_warning("/w", "careful").unwrap();
        assert!(sink.differs());
        let (out, _) = sink.into_parts();
        assert!(String::from_utf8(out).unwrap().contains("Error: /w"));
    }

    #[test]
    fn test_warning_does_not_differ() {
        let mut sink = DiagnosticsSink::new(Vec::new(), false);
        sink.record_warning("/w", "careful").unwrap();
        assert!(!sink.differs());
        assert_eq!(sink.warning_count(), 1);
    }

    #[test]
    fn test_diff_records_only_errors_and_append_on_same_key() {
        let diff = DiffContainer::new("run.3.json", "run/run.3.json", "base/run.3.json");
        let mut sink = DiagnosticsSink::new(Vec::new(), false).with_diff(diff);
        sink.record_error("/x", "one").unwrap();
        sink.record_error("/x", "two").unwrap();
        sink.record_warning("/y", "ignored").unwrap();
        let (_, diff) = sink.into_parts();
        let diff = diff.unwrap();
        assert_eq!(diff.len(), 1);
        let record = diff.records().next().unwrap();
        assert_eq!(record.key, "run.3.json//x");
        assert_eq!(record.message, "one\ntwo");
    }

    #[test]
    fn test_to_group_nests_key_components() {
        let mut diff = DiffContainer::new("t.json", "/r/t.json", "/b/t.json");
        diff.add("/mesh/x", "bad");
        let group = diff.to_group();
        let Some(Node::Group(top)) = group.get("t.json") else {
            panic!("missing identifier group");
        };
        let Some(Node::Group(mesh)) = top.get("mesh") else {
            panic!("missing mesh group");
        };
        let Some(Node::Group(x)) = mesh.get("x") else {
            panic!("missing record group");
        };
        assert_eq!(x.dataset("message").unwrap().value, Array::string("bad"));
        assert_eq!(
            x.get("run"),
            Some(&Node::ExternalLink(ExternalLink {
                file: "/r/t.json".into(),
                path: "/mesh/x".into()
            }))
        );
        assert!(x.contains("baseline"));
    }
}
