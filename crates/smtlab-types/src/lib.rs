//! Shared types for smtlab.
//!
//! Two groups live here: the resource model as the SMTLab service serves it
//! (runs, benchmarks, solvers, instances, results, validations), and the
//! versioned report document this tool produces from it.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use smtlab_error::UserInputError;
use std::fmt;
use std::str::FromStr;

pub const REPORT_SCHEMA_V1: &str = "smtlab.report.v1";

/// Label rendered wherever a cross-reference could not be resolved.
pub const PLACEHOLDER: &str = "???";

/// Server-assigned identifier. Opaque apart from being an integer on the wire.
#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct Id(pub u64);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = UserInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Id)
            .map_err(|_| UserInputError::InvalidRunId {
                input: s.to_string(),
            })
    }
}

#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Sat,
    Unsat,
    Timeout,
    Unknown,
    Error,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Sat,
        Outcome::Unsat,
        Outcome::Timeout,
        Outcome::Unknown,
        Outcome::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Sat => "sat",
            Outcome::Unsat => "unsat",
            Outcome::Timeout => "timeout",
            Outcome::Unknown => "unknown",
            Outcome::Error => "error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ----------------------------
// Resource model (wire format)
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Run {
    pub id: Id,
    pub benchmark_id: Id,
    pub solver_id: Id,

    /// Solver arguments. Accepts a JSON list or a JSON-encoded list string.
    #[serde(default, deserialize_with = "deserialize_arguments")]
    pub arguments: Vec<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "started_at", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Benchmark {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Solver {
    pub id: Id,
    pub name: String,

    #[serde(default, deserialize_with = "deserialize_arguments")]
    pub default_arguments: Vec<String>,

    /// True for solvers that check other solvers' answers.
    #[serde(default)]
    pub validation_solver: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instance {
    pub id: Id,

    /// Path of the problem file relative to the benchmark root.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_id: Option<Id>,
}

/// One solver answer for one instance, as listed under a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SolverResult {
    pub id: Id,
    pub instance_id: Id,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Id>,

    #[serde(rename = "result")]
    pub outcome: Outcome,

    #[serde(rename = "runtime")]
    pub runtime_ms: u64,
}

/// The individually fetched form of a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultDetail {
    pub id: Id,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    #[serde(default)]
    pub validations: Vec<Validation>,
}

/// A validation solver's judgment about a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "ValidationRecord", into = "ValidationRecord")]
pub struct Validation {
    pub solver_id: Id,
    pub judgment: Judgment,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Judgment {
    /// The validator re-solved the instance and reports its own outcome.
    Result { outcome: Outcome },

    /// The validator checked the answer and accepts or rejects it.
    Verdict { valid: bool },
}

impl Judgment {
    pub fn text(&self) -> &'static str {
        match self {
            Judgment::Result { outcome } => outcome.as_str(),
            Judgment::Verdict { valid: true } => "valid",
            Judgment::Verdict { valid: false } => "invalid",
        }
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidityVerdict {
    Valid,
    Invalid,
}

/// Wire shape of a validation: exactly one of `result` / `validation` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRecord {
    solver_id: Id,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Outcome>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    validation: Option<ValidityVerdict>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationShapeError {
    #[error("validation by solver {0} has neither `result` nor `validation`")]
    Missing(Id),

    #[error("validation by solver {0} has both `result` and `validation`")]
    Ambiguous(Id),
}

impl TryFrom<ValidationRecord> for Validation {
    type Error = ValidationShapeError;

    fn try_from(raw: ValidationRecord) -> Result<Self, Self::Error> {
        let judgment = match (raw.result, raw.validation) {
            (Some(outcome), None) => Judgment::Result { outcome },
            (None, Some(v)) => Judgment::Verdict {
                valid: v == ValidityVerdict::Valid,
            },
            (None, None) => return Err(ValidationShapeError::Missing(raw.solver_id)),
            (Some(_), Some(_)) => return Err(ValidationShapeError::Ambiguous(raw.solver_id)),
        };
        Ok(Validation {
            solver_id: raw.solver_id,
            judgment,
        })
    }
}

impl From<Validation> for ValidationRecord {
    fn from(v: Validation) -> Self {
        let (result, validation) = match v.judgment {
            Judgment::Result { outcome } => (Some(outcome), None),
            Judgment::Verdict { valid: true } => (None, Some(ValidityVerdict::Valid)),
            Judgment::Verdict { valid: false } => (None, Some(ValidityVerdict::Invalid)),
        };
        ValidationRecord {
            solver_id: v.solver_id,
            result,
            validation,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawArguments {
    List(Vec<String>),
    Encoded(String),
}

/// The run-creation endpoint stores arguments as a JSON-encoded string, so
/// both `["-v"]` and `"[\"-v\"]"` show up on the wire.
fn deserialize_arguments<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawArguments> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => Vec::new(),
        Some(RawArguments::List(args)) => args,
        Some(RawArguments::Encoded(s)) => decode_encoded_arguments(&s),
    })
}

fn decode_encoded_arguments(s: &str) -> Vec<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    serde_json::from_str::<Vec<String>>(trimmed).unwrap_or_else(|_| vec![trimmed.to_string()])
}

// ----------------------------
// Report document
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Display name of a cross-referenced entity.
///
/// `Unresolved` is what a lookup miss produces; it renders as [`PLACEHOLDER`]
/// but keeps the dangling identifier so tests and JSON consumers can tell the
/// two apart.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Label {
    Resolved { name: String },
    Unresolved { id: Id },
}

impl Label {
    pub fn resolved(name: impl Into<String>) -> Self {
        Label::Resolved { name: name.into() }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Label::Resolved { .. })
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Resolved { name } => f.write_str(name),
            Label::Unresolved { .. } => f.write_str(PLACEHOLDER),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub sat: u64,
    pub unsat: u64,
    pub timeout: u64,
    pub unknown: u64,
    pub error: u64,
}

impl OutcomeCounts {
    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Sat => self.sat,
            Outcome::Unsat => self.unsat,
            Outcome::Timeout => self.timeout,
            Outcome::Unknown => self.unknown,
            Outcome::Error => self.error,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        let slot = match outcome {
            Outcome::Sat => &mut self.sat,
            Outcome::Unsat => &mut self.unsat,
            Outcome::Timeout => &mut self.timeout,
            Outcome::Unknown => &mut self.unknown,
            Outcome::Error => &mut self.error,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        self.sat + self.unsat + self.timeout + self.unknown + self.error
    }
}

/// Outcome counts and runtime totals of a run. Runtimes stay in integer
/// milliseconds; conversion to seconds is a rendering concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RunSummary {
    pub counts: OutcomeCounts,
    pub total_runtime_ms: u64,
    pub runtime_without_timeouts_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SuspectValidation {
    /// Validation solver that produced the judgment.
    pub solver: Label,

    /// The judgment as the validator stated it (`unsat`, `invalid`).
    pub judgment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResultCheck {
    pub result_id: Id,
    pub outcome: Outcome,
    pub runtime_ms: u64,
    pub validations_ok: u32,
    pub validations_total: u32,
    pub suspects: Vec<SuspectValidation>,

    /// Captured solver output; only carried for `error` outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InstanceCheck {
    pub instance_id: Id,
    pub instance: Label,
    pub results: Vec<ResultCheck>,
}

impl InstanceCheck {
    pub fn validations_ok(&self) -> u32 {
        self.results
            .iter()
            .fold(0u32, |acc, r| acc.saturating_add(r.validations_ok))
    }

    pub fn validations_total(&self) -> u32 {
        self.results
            .iter()
            .fold(0u32, |acc, r| acc.saturating_add(r.validations_total))
    }

    pub fn has_issues(&self) -> bool {
        self.results.iter().any(|r| !r.suspects.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CrossCheck {
    /// Benchmark instances in benchmark order, then results whose instance
    /// could not be resolved, grouped by instance id.
    pub instances: Vec<InstanceCheck>,

    /// Number of instances with at least one suspect validation.
    pub instances_with_issues: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RunHeader {
    pub id: Id,
    pub solver: Label,
    pub benchmark: Label,
    pub arguments: Vec<String>,
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RunReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunHeader,
    pub result_count: u64,
    pub instance_count: u64,
    pub summary: RunSummary,
    pub validation: CrossCheck,
}

/// One line of the run listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RunListing {
    pub id: Id,
    pub solver: Label,
    pub benchmark: Label,
    pub arguments: Vec<String>,
    pub description: String,
}

// ----------------------------
// Optional config file schema
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Base URL of the SMTLab API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Per-request timeout, parseable by humantime (e.g. "30s").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Maximum number of result-detail fetches in flight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}
