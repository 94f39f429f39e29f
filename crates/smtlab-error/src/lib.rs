//! Unified error types for smtlab.
//!
//! A report generation fails in exactly one of three ways: a remote fetch
//! failed, the fetched data violates the data model, or the caller supplied
//! an unusable run identifier. Configuration loading has its own error type
//! because it happens before any report is requested.

use std::fmt;

/// Terminal error of a report generation.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    RemoteFetch(#[from] RemoteFetchError),

    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),

    #[error(transparent)]
    UserInput(#[from] UserInputError),
}

impl ReportError {
    /// HTTP status of a non-success response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            ReportError::RemoteFetch(RemoteFetchError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Decoded error payload returned by the server, if any.
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ReportError::RemoteFetch(RemoteFetchError::Status { body, .. }) => body.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteFetchError {
    #[error("GET {resource}: {message}")]
    Transport { resource: String, message: String },

    #[error("GET {resource}: server returned {status}{}", body_suffix(.body))]
    Status {
        resource: String,
        status: u16,
        body: Option<ErrorBody>,
    },
}

fn body_suffix(body: &Option<ErrorBody>) -> String {
    match body {
        Some(b) => format!(": {b}"),
        None => String::new(),
    }
}

/// Error payload of a non-success response.
///
/// The service answers errors with a JSON object; anything that does not
/// parse is kept as text so it can still be shown verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(serde_json::Value),
    Text(String),
}

impl ErrorBody {
    /// Decode a raw response body. Empty (or whitespace-only) bodies yield `None`.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(v) => Some(ErrorBody::Json(v)),
            Err(_) => Some(ErrorBody::Text(
                String::from_utf8_lossy(bytes).trim().to_string(),
            )),
        }
    }

    /// The human-readable message field, when the payload carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            ErrorBody::Json(v) => ["message", "error", "description"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str())),
            ErrorBody::Text(t) => Some(t.as_str()),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorBody::Json(v) => write!(f, "{v}"),
            ErrorBody::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataIntegrityError {
    /// The payload did not match the data model (unknown outcome, a
    /// validation with neither judgment field, a missing required field).
    #[error("{resource}: malformed payload: {message}")]
    Decode { resource: String, message: String },

    #[error("result {result_id}: no detail record was fetched")]
    MissingDetail { result_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserInputError {
    #[error("invalid run id {input:?}: expected a non-negative integer")]
    InvalidRunId { input: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid endpoint {value:?}: {message}")]
    InvalidEndpoint { value: String, message: String },

    #[error("invalid timeout {value:?}: {message}")]
    InvalidTimeout { value: String, message: String },

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}
