use crate::{ClientConfig, Credentials, ResourceClient};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use smtlab_error::{DataIntegrityError, ErrorBody, RemoteFetchError, ReportError};
use smtlab_types::{Benchmark, Id, Instance, ResultDetail, Run, Solver, SolverResult};
use tracing::{debug, warn};

/// [`ResourceClient`] over HTTP with optional basic authentication.
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    http: reqwest::Client,
    base: String,
    credentials: Option<Credentials>,
}

impl HttpResourceClient {
    pub fn new(config: ClientConfig) -> Result<Self, ReportError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteFetchError::Transport {
                resource: config.endpoint.to_string(),
                message: error_chain(&e),
            })?;
        Ok(Self {
            http,
            base: config.endpoint.as_str().trim_end_matches('/').to_string(),
            credentials: config.credentials,
        })
    }

    /// GET `path` (relative to the endpoint) and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ReportError> {
        let resource = format!("/{path}");
        let url = format!("{}{}", self.base, resource);
        debug!(%url, "fetching");

        let mut request = self.http.get(&url);
        if let Some(c) = &self.credentials {
            request = request.basic_auth(&c.username, Some(&c.password));
        }

        let transport = |e: reqwest::Error| RemoteFetchError::Transport {
            resource: resource.clone(),
            message: error_chain(&e),
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "non-success response");
            return Err(RemoteFetchError::Status {
                resource,
                status: status.as_u16(),
                body: ErrorBody::decode(&bytes),
            }
            .into());
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            DataIntegrityError::Decode {
                resource,
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// reqwest hides the interesting part (refused, timed out) in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        message.push_str(": ");
        message.push_str(&s.to_string());
        source = s.source();
    }
    message
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn get_run(&self, id: Id) -> Result<Run, ReportError> {
        self.get_json(&format!("runs/{id}")).await
    }

    async fn get_benchmark(&self, id: Id) -> Result<Benchmark, ReportError> {
        self.get_json(&format!("benchmarks/{id}")).await
    }

    async fn list_runs(&self) -> Result<Vec<Run>, ReportError> {
        self.get_json("runs").await
    }

    async fn list_benchmarks(&self) -> Result<Vec<Benchmark>, ReportError> {
        self.get_json("benchmarks").await
    }

    async fn list_solvers(&self) -> Result<Vec<Solver>, ReportError> {
        self.get_json("solvers").await
    }

    async fn list_instances(&self, benchmark_id: Id) -> Result<Vec<Instance>, ReportError> {
        self.get_json(&format!("benchmarks/{benchmark_id}/instances")).await
    }

    async fn list_results(&self, run_id: Id) -> Result<Vec<SolverResult>, ReportError> {
        self.get_json(&format!("runs/{run_id}/results")).await
    }

    async fn get_result_detail(&self, result_id: Id) -> Result<ResultDetail, ReportError> {
        self.get_json(&format!("results/{result_id}")).await
    }
}
