//! Report use case: resolve, aggregate, cross-check.

use crate::fetch::{fetch_details, resolve_graph};
use crate::tool_info;
use smtlab_client::ResourceClient;
use smtlab_domain::{ResourceGraph, build_report};
use smtlab_error::ReportError;
use smtlab_types::{Id, ResultDetail, RunReport};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Use case for producing the report of one run.
pub struct ReportUseCase {
    client: Arc<dyn ResourceClient>,
    concurrency: usize,
}

impl ReportUseCase {
    /// `concurrency` bounds the number of result-detail fetches in flight.
    pub fn new(client: Arc<dyn ResourceClient>, concurrency: usize) -> Self {
        Self {
            client,
            concurrency,
        }
    }

    /// Build the report document of `run_id`.
    ///
    /// Any fetch failure aborts the whole report; there is no partial
    /// result. Unresolvable cross-references do not abort it and show up as
    /// unresolved labels instead.
    pub async fn execute(&self, run_id: Id) -> Result<RunReport, ReportError> {
        info!(run = %run_id, "generating report");

        let graph = resolve_graph(self.client.as_ref(), run_id).await?;
        let ids = graph.results().iter().map(|r| r.id).collect();
        let details = fetch_details(Arc::clone(&self.client), ids, self.concurrency).await?;
        warn_unresolved(&graph, &details);

        let report = build_report(&graph, &details, tool_info())?;
        info!(
            run = %run_id,
            results = report.result_count,
            instances = report.instance_count,
            issues = report.validation.instances_with_issues,
            "report complete"
        );
        Ok(report)
    }
}

/// Generate the plain-text report of `run_id`.
pub async fn generate_report(
    client: Arc<dyn ResourceClient>,
    run_id: Id,
    concurrency: usize,
) -> Result<String, ReportError> {
    let report = ReportUseCase::new(client, concurrency)
        .execute(run_id)
        .await?;
    Ok(smtlab_render::render_report(&report))
}

fn warn_unresolved(graph: &ResourceGraph, details: &BTreeMap<Id, ResultDetail>) {
    let run = graph.run();
    if graph.solver(run.solver_id).is_none() {
        warn!(solver = %run.solver_id, "run solver not found, using placeholder");
    }
    for id in graph.unresolved_instance_ids() {
        warn!(instance = %id, "result instance not in benchmark, using placeholder");
    }
    let validators: BTreeSet<Id> = details
        .values()
        .flat_map(|d| d.validations.iter().map(|v| v.solver_id))
        .filter(|id| graph.solver(*id).is_none())
        .collect();
    for id in validators {
        warn!(solver = %id, "validation solver not found, using placeholder");
    }
}
