//! Run listing use case.

use smtlab_client::ResourceClient;
use smtlab_domain::build_run_listing;
use smtlab_error::ReportError;
use smtlab_types::RunListing;
use std::sync::Arc;
use tracing::info;

pub struct RunListingUseCase {
    client: Arc<dyn ResourceClient>,
}

impl RunListingUseCase {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self { client }
    }

    /// Every run on the server, joined with its solver and benchmark names.
    pub async fn execute(&self) -> Result<Vec<RunListing>, ReportError> {
        let client = self.client.as_ref();
        let (runs, benchmarks, solvers) = tokio::try_join!(
            client.list_runs(),
            client.list_benchmarks(),
            client.list_solvers(),
        )?;
        info!(runs = runs.len(), "listed runs");
        Ok(build_run_listing(&runs, &benchmarks, &solvers))
    }
}
