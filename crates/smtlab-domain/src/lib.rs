//! Domain logic for smtlab.
//!
//! This crate is intentionally I/O-free: it joins fetched resources,
//! aggregates outcomes and applies the validation policy.

mod aggregate;
mod crosscheck;
mod graph;

pub use aggregate::summarize_results;
pub use crosscheck::{Classification, check_result, classify, cross_check};
pub use graph::ResourceGraph;

use graph::index_by_id;
use smtlab_error::{DataIntegrityError, ReportError};
use smtlab_types::{
    Benchmark, Id, Label, REPORT_SCHEMA_V1, ResultDetail, Run, RunListing, RunReport, Solver,
    ToolInfo,
};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("result {result_id}: no detail record was fetched")]
    MissingDetail { result_id: Id },
}

impl From<DomainError> for ReportError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::MissingDetail { result_id } => {
                DataIntegrityError::MissingDetail {
                    result_id: result_id.0,
                }
                .into()
            }
        }
    }
}

/// Assemble the full report of one run.
pub fn build_report(
    graph: &ResourceGraph,
    details: &BTreeMap<Id, ResultDetail>,
    tool: ToolInfo,
) -> Result<RunReport, DomainError> {
    let validation = cross_check(graph, details)?;
    Ok(RunReport {
        schema: REPORT_SCHEMA_V1.to_string(),
        tool,
        run: graph.header(),
        result_count: graph.results().len() as u64,
        instance_count: graph.distinct_instance_count() as u64,
        summary: summarize_results(graph.results()),
        validation,
    })
}

/// Join every run with its solver and benchmark names, in listing order.
pub fn build_run_listing(
    runs: &[Run],
    benchmarks: &[Benchmark],
    solvers: &[Solver],
) -> Vec<RunListing> {
    let benchmark_index = index_by_id(benchmarks.iter().map(|b| b.id));
    let solver_index = index_by_id(solvers.iter().map(|s| s.id));

    runs.iter()
        .map(|run| RunListing {
            id: run.id,
            solver: match solver_index.get(&run.solver_id) {
                Some(&i) => Label::resolved(solvers[i].name.clone()),
                None => Label::Unresolved { id: run.solver_id },
            },
            benchmark: match benchmark_index.get(&run.benchmark_id) {
                Some(&i) => Label::resolved(benchmarks[i].name.clone()),
                None => Label::Unresolved {
                    id: run.benchmark_id,
                },
            },
            arguments: run.arguments.clone(),
            description: run.description.trim().to_string(),
        })
        .collect()
}
