//! Application layer for smtlab.
//!
//! The app layer coordinates the resource client and domain logic.
//! It does not parse CLI flags and it does not do filesystem I/O.

mod fetch;
mod listing;
mod report;

pub use fetch::{fetch_details, resolve_graph};
pub use listing::RunListingUseCase;
pub use report::{ReportUseCase, generate_report};

use smtlab_types::ToolInfo;

/// Identity stamped into every report document.
pub fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "smtlab".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
