//! Outcome aggregation.

use smtlab_types::{Outcome, RunSummary, SolverResult};

/// Reduce a run's results to outcome counts and runtime totals.
///
/// One pass, integer milliseconds throughout, so the result does not depend
/// on the order of `results`.
pub fn summarize_results(results: &[SolverResult]) -> RunSummary {
    let mut summary = RunSummary::default();
    for r in results {
        summary.counts.record(r.outcome);
        summary.total_runtime_ms = summary.total_runtime_ms.saturating_add(r.runtime_ms);
        if r.outcome != Outcome::Timeout {
            summary.runtime_without_timeouts_ms =
                summary.runtime_without_timeouts_ms.saturating_add(r.runtime_ms);
        }
    }
    summary
}
