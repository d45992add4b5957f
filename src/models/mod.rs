//! Data models for the anonymization rules backend.
//!
//! Field names follow the upstream rule service and the dashboard frontend (camelCase).

mod edit;
mod hierarchy;
mod report;
mod rule;

pub use edit::*;
pub use hierarchy::*;
pub use report::*;
pub use rule::*;
