//! Parallel dispatch of file pairs.
//!
//! Worker `r` of `P` handles pair indices `r, r+P, r+2P, ...` on its own
//! scoped thread and hands its results back when joined. The coordinator
//! restores pair order before anything is concatenated, so the merged report
//! does not depend on `P`. A job that panics fails only its own pair.

#![allow(clippy::result_large_err)]

use restartcheck_core::diff::render_pair_verdict;
use restartcheck_core::errors::{ExError, ExErrorKind};
use restartcheck_core_types::WorkerId;
use restartcheck_store::errors::Result;
use restartcheck_store::FilePair;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

/// Result of comparing one pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairResult {
    pub index: usize,
    pub target: String,
    pub baseline: String,
    pub differs: bool,
    pub report: String,
}

impl PairResult {
    /// Result for a pair whose job panicked
    fn failed(pair: &FilePair) -> Self {
        let target = pair.target.display().to_string();
        let baseline = pair.baseline.display().to_string();
        let report = format!(
            "Comparing {} with {}\nThe comparison failed before finishing this pair.\n{}",
            target,
            baseline,
            render_pair_verdict(true)
        );
        Self {
            index: pair.index,
            target,
            baseline,
            differs: true,
            report,
        }
    }
}

/// Merged results in pair order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub results: Vec<PairResult>,
}

impl DispatchOutcome {
    /// True iff any pair differs
    pub fn differs(&self) -> bool {
        self.results.iter().any(|r| r.differs)
    }

    /// Differing pairs in pair order
    pub fn differing(&self) -> impl Iterator<Item = &PairResult> {
        self.results.iter().filter(|r| r.differs)
    }

    /// Every per-pair report, concatenated in pair order
    pub fn report(&self) -> String {
        self.results.iter().map(|r| r.report.as_str()).collect()
    }
}

/// Clamp the requested worker count to `[1, n_pairs]`
pub fn effective_workers(requested: usize, n_pairs: usize) -> usize {
    requested.clamp(1, n_pairs.max(1))
}

/// Pair indices assigned to worker `rank` of `workers`
pub fn assigned_indices(rank: usize, workers: usize, n_pairs: usize) -> impl Iterator<Item = usize> {
    (rank..n_pairs).step_by(workers.max(1))
}

/// Run `job` on one pair, turning a panic into a differing result
fn run_job<F>(job: &F, pair: &FilePair) -> PairResult
where
    F: Fn(&FilePair) -> PairResult,
{
    catch_unwind(AssertUnwindSafe(|| job(pair))).unwrap_or_else(|_| {
        tracing::error!(pair_index = pair.index, "comparison panicked, marking the pair as different");
        PairResult::failed(pair)
    })
}

/// Run `job` over every pair on up to `workers` threads
pub fn dispatch<F>(pairs: &[FilePair], workers: usize, job: F) -> Result<DispatchOutcome>
where
    F: Fn(&FilePair) -> PairResult + Sync,
{
    let workers = effective_workers(workers, pairs.len());
    let parent = tracing::Span::current();
    let job = &job;

    let per_worker: Vec<Vec<PairResult>> = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for rank in 0..workers {
            let worker = WorkerId(rank);
            let parent = parent.clone();
            let handle = thread::Builder::new()
                .name(worker.thread_name())
                .spawn_scoped(scope, move || {
                    let _span = tracing::info_span!(parent: &parent, "worker", worker = rank).entered();
                    assigned_indices(rank, workers, pairs.len())
                        .map(|i| run_job(job, &pairs[i]))
                        .collect::<Vec<_>>()
                })
                .map_err(|e| {
                    ExError::new(ExErrorKind::Concurrency)
                        .with_op("dispatch_spawn")
                        .with_message(format!("failed to start {}: {}", worker.thread_name(), e))
                })?;
            handles.push((worker, handle));
        }

        Ok::<_, ExError>(
            handles
                .into_iter()
                .map(|(worker, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        tracing::error!(worker = worker.0, "worker panicked, marking its pairs as different");
                        assigned_indices(worker.0, workers, pairs.len())
                            .map(|i| PairResult::failed(&pairs[i]))
                            .collect()
                    })
                })
                .collect(),
        )
    })?;

    let mut results: Vec<PairResult> = per_worker.into_iter().flatten().collect();
    results.sort_by_key(|r| r.index);
    Ok(DispatchOutcome { results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn pairs(n: usize) -> Vec<FilePair> {
        (0..n)
            .map(|i| FilePair {
                index: i,
                target: PathBuf::from(format!("run/p_{}.json", i)),
                baseline: PathBuf::from(format!("base/p_{}.json", i)),
            })
            .collect()
    }

    fn fake_job(pair: &FilePair) -> PairResult {
        let differs = pair.index % 3 == 1;
        PairResult {
            index: pair.index,
            target: pair.target.display().to_string(),
            baseline: pair.baseline.display().to_string(),
            differs,
            report: format!("pair {} on {:?}\n", pair.index, differs),
        }
    }

    #[test]
    fn test_round_robin_assignment() {
        let got: Vec<usize> = assigned_indices(1, 4, 10).collect();
        assert_eq!(got, vec![1, 5, 9]);
        assert_eq!(assigned_indices(3, 4, 3).count(), 0);
    }

    #[test]
    fn test_worker_count_is_clamped() {
        assert_eq!(effective_workers(0, 5), 1);
        assert_eq!(effective_workers(8, 3), 3);
        assert_eq!(effective_workers(4, 0), 1);
    }

    #[test]
    fn test_merge_is_independent_of_worker_count() {
        let input = pairs(10);
        let one = dispatch(&input, 1, fake_job).unwrap();
        let four = dispatch(&input, 4, fake_job).unwrap();
        assert_eq!(one, four);
        assert_eq!(one.differing().map(|r| r.index).collect::<Vec<_>>(), vec![1, 4, 7]);
        assert!(one.report().starts_with("pair 0 on false\npair 1 on true\n"));
    }

    fn job_panicking_on_pair_one(pair: &FilePair) -> PairResult {
        if pair.index == 1 {
            panic!("boom");
        }
        fake_job(pair)
    }

    #[test]
    fn test_panicking_pair_fails_alone_for_any_worker_count() {
        let input = pairs(6);
        let one = dispatch(&input, 1, job_panicking_on_pair_one).unwrap();
        let four = dispatch(&input, 4, job_panicking_on_pair_one).unwrap();
        assert_eq!(one, four);
        assert_eq!(one.results.len(), 6);
        assert!(one.results[1].report.contains("The comparison failed"));
        // pair 4 differs from fake_job itself; pair 5 shares pair 1's worker when P=4
        assert_eq!(one.differing().map(|r| r.index).collect::<Vec<_>>(), vec![1, 4]);
        assert!(!one.results[5].differs);
        assert_eq!(one.results[5].report, "pair 5 on false\n");
    }

    #[test]
    fn test_empty_input() {
        let outcome = dispatch(&[], 4, fake_job).unwrap();
        assert!(outcome.results.is_empty());
        assert!(!outcome.differs());
    }
}
