//! End-to-end restart check.
//!
//! ## Run (in order):
//! 1. Resolve both patterns to files (no match is fatal)
//! 2. Write the report header
//! 3. Root indirection: compare the two root files, then expand into shard pairs
//! 4. Dispatch the pairs over the worker pool
//! 5. Concatenate per-pair reports in pair order and append the summary
//! 6. Write `<base>.restartcheck` atomically
//!
//! The per-pair job writes `<base>.<i>.restartcheck` and, when anything was
//! recorded, `<base>.<i>.diff.<ext>`. A pair whose containers cannot be read
//! differs; the run carries on with the remaining pairs.

#![allow(clippy::result_large_err)]

use crate::dispatch::{dispatch, effective_workers, PairResult};
use restartcheck_core::config::{ComparisonConfig, ExclusionSet, Tolerance};
use restartcheck_core::diagnostics::{DiagnosticsSink, DiffContainer};
use restartcheck_core::diff::{compare_trees, render_pair_verdict, render_run_summary};
use restartcheck_core::errors::{ExError, ExErrorKind};
use restartcheck_core::{log_op_end, log_op_error, log_op_start, Group};
use restartcheck_core_types::RunId;
use restartcheck_store::atomic::atomic_write;
use restartcheck_store::errors::Result;
use restartcheck_store::resolver::{extension_or_default, resolve_required};
use restartcheck_store::root::{is_root_pair, ROOT_EXCLUSIONS};
use restartcheck_store::{
    expand_shards, output_base_path, read_container, read_root_info, write_container, FilePair,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Message written when the two root files disagree
pub const ROOT_DIFFERENT: &str = "The root files are different, cannot compare data files.";

/// Message written when the two root files agree
pub const ROOT_SIMILAR: &str = "The root files are similar.";

/// Options for one check run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Pattern selecting the file to compare
    pub file_pattern: String,
    /// Pattern selecting the baseline file
    pub baseline_pattern: String,
    pub config: ComparisonConfig,
    /// Requested worker count; clamped to the number of pairs
    pub jobs: usize,
}

/// Result of a completed check run.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub run_id: RunId,
    /// `<base>.restartcheck`
    pub output_path: PathBuf,
    /// Full text of the root report
    pub text: String,
    /// Number of pairs compared (0 if the root files differ)
    pub n_pairs: usize,
    /// `(target, baseline)` of every differing pair, in pair order
    pub differing: Vec<(String, String)>,
    /// Overall verdict
    pub differs: bool,
}

/// `base` with `suffix` appended to its final component
fn suffixed(base: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Per-pair report path `<base>.<i>.restartcheck`
pub fn pair_report_path(base: &Path, index: usize) -> PathBuf {
    suffixed(base, &format!(".{}.restartcheck", index))
}

/// Per-pair diff path `<base>.<i>.diff.<ext>`
pub fn pair_diff_path(base: &Path, index: usize, extension: &str) -> PathBuf {
    suffixed(base, &format!(".{}.diff.{}", index, extension))
}

fn render_header(
    options: &CheckOptions,
    target: &Path,
    baseline: &Path,
    output_path: &Path,
) -> String {
    let config = &options.config;
    let excluded = config
        .exclusions
        .patterns()
        .iter()
        .map(|p| format!("'{}'", p))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Comparison of file {} from pattern {}\n\
         Baseline file {} from pattern {}\n\
         Relative tolerance: {:?}\n\
         Absolute tolerance: {:?}\n\
         Output file: {}\n\
         Excluded groups: [{}]\n\
         Warnings are errors: {}\n\n",
        target.display(),
        options.file_pattern,
        baseline.display(),
        options.baseline_pattern,
        config.tolerance.relative(),
        config.tolerance.absolute(),
        output_path.display(),
        excluded,
        config.warnings_are_errors,
    )
}

/// Configuration used to compare two root files
pub fn root_config() -> Result<ComparisonConfig> {
    Ok(
        ComparisonConfig::new(Tolerance::exact(), ExclusionSet::new(ROOT_EXCLUSIONS)?)
            .with_warnings_are_errors(true),
    )
}

/// Compare two root files, appending their findings and verdict to `report`.
///
/// Returns the shard pairs when the roots agree, `None` when they differ.
fn expand_root_pair(
    target: &Path,
    baseline: &Path,
    report: &mut String,
) -> Result<Option<Vec<FilePair>>> {
    let target_root = read_container(target)?;
    let baseline_root = read_container(baseline)?;

    let outcome = compare_trees(&target_root, &baseline_root, &root_config()?);
    let mut sink = DiagnosticsSink::new(Vec::new(), true);
    sink.record_outcome(&outcome)?;
    let differs = sink.differs();
    let (bytes, _) = sink.into_parts();
    report.push_str(&String::from_utf8_lossy(&bytes));

    if differs {
        tracing::debug!(n_findings = outcome.findings.len(), "root files differ");
        report.push_str(ROOT_DIFFERENT);
        report.push('\n');
        return Ok(None);
    }
    report.push_str(ROOT_SIMILAR);
    report.push('\n');

    let target_info = read_root_info(&target_root)?;
    let baseline_info = read_root_info(&baseline_root)?;
    expand_shards(target, &target_info, baseline, &baseline_info).map(Some)
}

fn read_pair(pair: &FilePair) -> Result<(Group, Group)> {
    Ok((read_container(&pair.target)?, read_container(&pair.baseline)?))
}

/// Compare one pair and write its report and diff files; returns (differs, report)
fn compare_pair_impl(
    pair: &FilePair,
    base: &Path,
    config: &ComparisonConfig,
) -> Result<(bool, String)> {
    let target = pair.target.display().to_string();
    let baseline = pair.baseline.display().to_string();
    let heading = format!("Comparing {} with {}", target, baseline);

    let (differs, text, diff) = match read_pair(pair) {
        Ok((target_root, baseline_root)) => {
            let identifier = pair
                .target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| target.clone());
            let mut sink = DiagnosticsSink::new(Vec::new(), config.warnings_are_errors)
                .with_diff(DiffContainer::new(identifier, target.clone(), baseline.clone()));
            sink.write_line(&heading)?;
            sink.record_outcome(&compare_trees(&target_root, &baseline_root, config))?;
            let differs = sink.differs();
            let (bytes, diff) = sink.into_parts();
            (differs, bytes, diff)
        }
        Err(e) => {
            tracing::warn!(pair_index = pair.index, err.code = e.code(), "could not read pair");
            let mut sink = DiagnosticsSink::new(Vec::new(), config.warnings_are_errors);
            sink.write_line(&heading)?;
            sink.record_error(e.path().unwrap_or(target.as_str()), &e.to_string())?;
            let (bytes, _) = sink.into_parts();
            (true, bytes, None)
        }
    };

    let mut report = String::from_utf8_lossy(&text).into_owned();
    report.push_str(render_pair_verdict(differs));

    atomic_write(&pair_report_path(base, pair.index), report.as_bytes())?;
    if let Some(diff) = diff.filter(|d| !d.is_empty()) {
        let path = pair_diff_path(base, pair.index, &extension_or_default(&pair.target));
        write_container(&path, &diff.to_group())?;
    }
    Ok((differs, report))
}

/// Job run by a worker for one pair. Never fails: operational errors make the
/// pair differ and are written into its report.
pub fn compare_pair(pair: &FilePair, base: &Path, config: &ComparisonConfig) -> PairResult {
    log_op_start!("compare_pair", pair_index = pair.index);
    let start = Instant::now();

    let (differs, report) = match compare_pair_impl(pair, base, config) {
        Ok(result) => result,
        Err(e) => {
            let report = format!(
                "Comparing {} with {}\n{}\n{}",
                pair.target.display(),
                pair.baseline.display(),
                e,
                render_pair_verdict(true)
            );
            log_op_error!(
                "compare_pair",
                e,
                duration_ms = start.elapsed().as_millis() as u64,
                pair_index = pair.index
            );
            (true, report)
        }
    };

    log_op_end!(
        "compare_pair",
        duration_ms = start.elapsed().as_millis() as u64,
        pair_index = pair.index,
        differs = differs
    );
    PairResult {
        index: pair.index,
        target: pair.target.display().to_string(),
        baseline: pair.baseline.display().to_string(),
        differs,
        report,
    }
}

/// Run a complete check and write the root report.
///
/// # Errors
///
/// Fails when a pattern matches nothing, when a root file cannot be read or
/// names an unusable shard template, or when the root report cannot be
/// written. Differences are not errors; see [`CheckReport::differs`].
pub fn check(options: &CheckOptions) -> Result<CheckReport> {
    let run_id = RunId::new();
    let span = tracing::info_span!("check", run_id = %run_id);
    let _guard = span.enter();

    log_op_start!(
        "check",
        file_pattern = options.file_pattern.as_str(),
        baseline_pattern = options.baseline_pattern.as_str(),
        jobs = options.jobs
    );
    let start = Instant::now();

    let result = check_impl(options, run_id.clone()).map_err(|e| {
        log_op_error!("check", e.clone(), duration_ms = start.elapsed().as_millis() as u64);
        e.with_run_id(run_id)
    })?;

    log_op_end!(
        "check",
        duration_ms = start.elapsed().as_millis() as u64,
        n_pairs = result.n_pairs,
        n_differing = result.differing.len()
    );
    Ok(result)
}

fn check_impl(options: &CheckOptions, run_id: RunId) -> Result<CheckReport> {
    if options.jobs == 0 {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("check")
            .with_message("the number of jobs must be at least 1"));
    }

    let target = resolve_required(&options.file_pattern)?;
    let baseline = resolve_required(&options.baseline_pattern)?;
    let base = output_base_path(&target);
    let output_path = suffixed(&base, ".restartcheck");

    let mut text = render_header(options, &target, &baseline, &output_path);

    let pairs = if is_root_pair(&target, &baseline) {
        match expand_root_pair(&target, &baseline, &mut text)? {
            Some(pairs) => pairs,
            None => {
                atomic_write(&output_path, text.as_bytes())?;
                return Ok(CheckReport {
                    run_id,
                    output_path,
                    text,
                    n_pairs: 0,
                    differing: Vec::new(),
                    differs: true,
                });
            }
        }
    } else {
        vec![FilePair {
            index: 0,
            target: target.clone(),
            baseline: baseline.clone(),
        }]
    };

    tracing::debug!(
        n_pairs = pairs.len(),
        workers = effective_workers(options.jobs, pairs.len()),
        "dispatching pairs"
    );
    let outcome = dispatch(&pairs, options.jobs, |pair| {
        compare_pair(pair, &base, &options.config)
    })?;

    let differing: Vec<(String, String)> = outcome
        .differing()
        .map(|r| (r.target.clone(), r.baseline.clone()))
        .collect();
    text.push_str(&outcome.report());
    text.push_str(&render_run_summary(pairs.len(), &differing));

    atomic_write(&output_path, text.as_bytes())?;

    Ok(CheckReport {
        run_id,
        output_path,
        text,
        n_pairs: pairs.len(),
        differs: outcome.differs(),
        differing,
    })
}
