//! Client library for the SMTLab REST service.
//!
//! [`ResourceClient`] is the seam the report pipeline fetches through; the
//! production implementation is [`HttpResourceClient`], and tests substitute
//! an in-memory fake.
//!
//! Every failure is reported as a [`ReportError`]: transport problems and
//! non-success statuses as `RemoteFetch`, payloads that do not match the
//! resource model as `DataIntegrity`.

mod http;

pub use http::HttpResourceClient;

use async_trait::async_trait;
use smtlab_error::ReportError;
use smtlab_types::{Benchmark, Id, Instance, ResultDetail, Run, Solver, SolverResult};
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only access to the SMTLab resources.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn get_run(&self, id: Id) -> Result<Run, ReportError>;

    async fn get_benchmark(&self, id: Id) -> Result<Benchmark, ReportError>;

    async fn list_runs(&self) -> Result<Vec<Run>, ReportError>;

    async fn list_benchmarks(&self) -> Result<Vec<Benchmark>, ReportError>;

    async fn list_solvers(&self) -> Result<Vec<Solver>, ReportError>;

    /// Instances of a benchmark, in the order the service lists them.
    async fn list_instances(&self, benchmark_id: Id) -> Result<Vec<Instance>, ReportError>;

    async fn list_results(&self, run_id: Id) -> Result<Vec<SolverResult>, ReportError>;

    async fn get_result_detail(&self, result_id: Id) -> Result<ResultDetail, ReportError>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection settings of [`HttpResourceClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
