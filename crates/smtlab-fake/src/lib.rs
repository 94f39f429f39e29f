//! Test utilities and fake implementations for smtlab.
//!
//! [`FakeResourceClient`] serves resources from memory, records every
//! request by resource path, and can be told to fail specific paths.

use async_trait::async_trait;
use smtlab_client::ResourceClient;
use smtlab_error::{ErrorBody, RemoteFetchError, ReportError};
use smtlab_types::{Benchmark, Id, Instance, ResultDetail, Run, Solver, SolverResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// In-memory [`ResourceClient`].
///
/// # Example
///
/// ```
/// use smtlab_fake::FakeResourceClient;
/// use smtlab_client::ResourceClient;
/// use smtlab_types::{Benchmark, Id};
///
/// # tokio_test_block_on(async {
/// let client = FakeResourceClient::new().with_benchmark(Benchmark {
///     id: Id(2),
///     name: "QF_S".into(),
/// });
/// assert_eq!(client.get_benchmark(Id(2)).await.unwrap().name, "QF_S");
/// assert_eq!(client.calls(), vec!["/benchmarks/2"]);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct FakeResourceClient {
    runs: Vec<Run>,
    benchmarks: Vec<Benchmark>,
    solvers: Vec<Solver>,
    instances: Vec<Instance>,
    results: Vec<SolverResult>,
    details: HashMap<Id, ResultDetail>,
    failures: HashMap<String, (u16, String)>,
    detail_delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeResourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn with_benchmark(mut self, benchmark: Benchmark) -> Self {
        self.benchmarks.push(benchmark);
        self
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solvers.push(solver);
        self
    }

    /// Instances are listed under their `benchmark_id`.
    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instances.push(instance);
        self
    }

    /// Results are listed under their `run_id`.
    pub fn with_result(mut self, result: SolverResult) -> Self {
        self.results.push(result);
        self
    }

    pub fn with_detail(mut self, detail: ResultDetail) -> Self {
        self.details.insert(detail.id, detail);
        self
    }

    /// Answer `resource` (e.g. `/solvers`) with `status` and a JSON
    /// `{"message": ...}` body.
    pub fn failing(mut self, resource: &str, status: u16, message: &str) -> Self {
        self.failures
            .insert(resource.to_string(), (status, message.to_string()));
        self
    }

    /// Hold every detail fetch open for `delay` so concurrency is observable.
    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = Some(delay);
        self
    }

    /// Resource paths requested so far, in request order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Highest number of detail fetches that were in flight at once.
    pub fn max_concurrent_detail_fetches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn request(&self, resource: String) -> Result<(), ReportError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(resource.clone());
        match self.failures.get(&resource) {
            Some((status, message)) => Err(status_error(resource, *status, message)),
            None => Ok(()),
        }
    }
}

fn status_error(resource: String, status: u16, message: &str) -> ReportError {
    RemoteFetchError::Status {
        resource,
        status,
        body: Some(ErrorBody::Json(serde_json::json!({ "message": message }))),
    }
    .into()
}

fn not_found<T>(resource: String) -> Result<T, ReportError> {
    Err(status_error(resource, 404, "not found"))
}

#[async_trait]
impl ResourceClient for FakeResourceClient {
    async fn get_run(&self, id: Id) -> Result<Run, ReportError> {
        let resource = format!("/runs/{id}");
        self.request(resource.clone())?;
        match self.runs.iter().find(|r| r.id == id) {
            Some(run) => Ok(run.clone()),
            None => not_found(resource),
        }
    }

    async fn get_benchmark(&self, id: Id) -> Result<Benchmark, ReportError> {
        let resource = format!("/benchmarks/{id}");
        self.request(resource.clone())?;
        match self.benchmarks.iter().find(|b| b.id == id) {
            Some(benchmark) => Ok(benchmark.clone()),
            None => not_found(resource),
        }
    }

    async fn list_runs(&self) -> Result<Vec<Run>, ReportError> {
        self.request("/runs".to_string())?;
        Ok(self.runs.clone())
    }

    async fn list_benchmarks(&self) -> Result<Vec<Benchmark>, ReportError> {
        self.request("/benchmarks".to_string())?;
        Ok(self.benchmarks.clone())
    }

    async fn list_solvers(&self) -> Result<Vec<Solver>, ReportError> {
        self.request("/solvers".to_string())?;
        Ok(self.solvers.clone())
    }

    async fn list_instances(&self, benchmark_id: Id) -> Result<Vec<Instance>, ReportError> {
        self.request(format!("/benchmarks/{benchmark_id}/instances"))?;
        Ok(self
            .instances
            .iter()
            .filter(|i| i.benchmark_id == Some(benchmark_id))
            .cloned()
            .collect())
    }

    async fn list_results(&self, run_id: Id) -> Result<Vec<SolverResult>, ReportError> {
        self.request(format!("/runs/{run_id}/results"))?;
        Ok(self
            .results
            .iter()
            .filter(|r| r.run_id == Some(run_id))
            .cloned()
            .collect())
    }

    async fn get_result_detail(&self, result_id: Id) -> Result<ResultDetail, ReportError> {
        let resource = format!("/results/{result_id}");
        self.request(resource.clone())?;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.detail_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.details.get(&result_id) {
            Some(detail) => Ok(detail.clone()),
            None => not_found(resource),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_filter_by_owner() {
        let client = FakeResourceClient::new()
            .with_instance(Instance {
                id: Id(20),
                name: "a.smt2".into(),
                benchmark_id: Some(Id(2)),
            })
            .with_instance(Instance {
                id: Id(30),
                name: "other.smt2".into(),
                benchmark_id: Some(Id(3)),
            });
        let instances = client.list_instances(Id(2)).await.unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].id, Id(20));
    }

    #[tokio::test]
    async fn missing_resource_is_not_found() {
        let client = FakeResourceClient::new();
        let err = client.get_run(Id(9)).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(client.calls(), vec!["/runs/9"]);
    }

    #[tokio::test]
    async fn injected_failure_is_returned_and_recorded() {
        let client = FakeResourceClient::new().failing("/solvers", 503, "maintenance");
        let err = client.list_solvers().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.body().and_then(ErrorBody::message), Some("maintenance"));
        assert_eq!(client.calls(), vec!["/solvers"]);
    }
}
