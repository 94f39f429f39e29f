//! smtlab workspace-level test utilities.
//!
//! This crate exists solely to support workspace-level integration tests,
//! particularly the BDD/cucumber tests in `tests/cucumber.rs`.
//!
//! The actual smtlab functionality is in the workspace member crates:
//! - `smtlab-types`: Resource model, report documents and JSON schemas
//! - `smtlab-domain`: Resource joining, aggregation and the validation policy
//! - `smtlab-client`: HTTP client for the SMTLab service
//! - `smtlab-app`: Application use cases
//! - `smtlab-cli`: CLI interface (the `smtlab` binary)
