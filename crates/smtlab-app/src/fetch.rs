//! Fetch stages of the report pipeline.

use smtlab_client::ResourceClient;
use smtlab_domain::ResourceGraph;
use smtlab_error::{DataIntegrityError, RemoteFetchError, ReportError};
use smtlab_types::{Id, ResultDetail};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

/// Fetch the run, then everything it references.
///
/// The four fetches after the run are independent and issued together; the
/// first failure cancels the rest.
pub async fn resolve_graph(
    client: &dyn ResourceClient,
    run_id: Id,
) -> Result<ResourceGraph, ReportError> {
    let run = client.get_run(run_id).await?;
    let (benchmark, solvers, instances, results) = tokio::try_join!(
        client.get_benchmark(run.benchmark_id),
        client.list_solvers(),
        client.list_instances(run.benchmark_id),
        client.list_results(run.id),
    )?;
    debug!(
        run = %run.id,
        solvers = solvers.len(),
        instances = instances.len(),
        results = results.len(),
        "resolved run"
    );
    Ok(ResourceGraph::new(run, benchmark, solvers, instances, results))
}

/// Fetch one detail record per id with at most `limit` requests in flight.
///
/// Records are keyed by id, so arrival order does not matter. On the first
/// failure no further requests are started and the in-flight ones are
/// cancelled.
pub async fn fetch_details(
    client: Arc<dyn ResourceClient>,
    ids: Vec<Id>,
    limit: usize,
) -> Result<BTreeMap<Id, ResultDetail>, ReportError> {
    let limit = limit.max(1);
    debug!(count = ids.len(), limit, "fetching result details");

    let mut pending = ids.into_iter();
    let mut tasks = JoinSet::new();
    let mut details = BTreeMap::new();

    loop {
        while tasks.len() < limit {
            let Some(id) = pending.next() else { break };
            let client = Arc::clone(&client);
            tasks.spawn(async move { (id, client.get_result_detail(id).await) });
        }

        let Some(joined) = tasks.join_next().await else {
            break;
        };
        let (id, fetched) = joined.map_err(|e| RemoteFetchError::Transport {
            resource: "/results".to_string(),
            message: format!("detail fetch task failed: {e}"),
        })?;
        let detail = fetched?;
        if detail.id != id {
            return Err(DataIntegrityError::Decode {
                resource: format!("/results/{id}"),
                message: format!("detail record carries id {}", detail.id),
            }
            .into());
        }
        details.insert(id, detail);
    }

    Ok(details)
}
