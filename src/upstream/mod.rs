//! Upstream rule service.
//!
//! The rule service owns the persisted hierarchy. Everything in this crate
//! reaches it through [`RuleService`], either over HTTP or against the
//! in-memory fixture dataset.

mod fixtures;
mod http;

#[cfg(test)]
pub use fixtures::demo_hierarchy;
pub use fixtures::FixtureRuleService;
pub use http::HttpRuleService;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::{DocumentClass, Hierarchy, Level, ReportFilters, RuleAssignment, RulesReport};

/// Message used when a failure carries no usable text.
pub const GENERIC_ERROR_MESSAGE: &str = "Unknown error";

/// Failure of a single upstream call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// Non-2xx answer. `message` is the body's `message` field when present.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Rule service unreachable: {0}")]
    Transport(String),

    #[error("Invalid response from rule service: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Human-readable text for inline error display.
    pub fn message(&self) -> String {
        let text = match self {
            UpstreamError::Status { message, .. } => message.trim().to_string(),
            other => other.to_string(),
        };
        if text.is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            text
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, UpstreamError::Transport(_))
    }
}

/// Where rule data is currently served from.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    Live,
    Fixtures,
}

/// Reachability of the rule service.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub mode: ServiceMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_url: Option<String>,
    pub available: bool,
    /// Reads are served from the fixture dataset while the upstream is down.
    pub fallback_active: bool,
}

/// Read/write contract of the rule service.
#[async_trait]
pub trait RuleService: Send + Sync {
    /// Full hierarchy with nested types and labels.
    async fn list_classes(&self) -> Result<Hierarchy, UpstreamError>;

    async fn get_class(&self, id: &str) -> Result<DocumentClass, UpstreamError>;

    /// Persist the rule of one entity at the given level.
    async fn update_rule(
        &self,
        level: Level,
        id: &str,
        assignment: RuleAssignment,
    ) -> Result<(), UpstreamError>;

    async fn rules_report(&self, filters: &ReportFilters) -> Result<RulesReport, UpstreamError>;

    async fn status(&self) -> ServiceStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_prefers_structured_text() {
        let err = UpstreamError::Status {
            status: 400,
            message: "Dias inválidos".to_string(),
        };
        assert_eq!(err.message(), "Dias inválidos");
    }

    #[test]
    fn test_message_falls_back_to_display_then_generic() {
        let err = UpstreamError::Transport("connection refused".to_string());
        assert_eq!(err.message(), "Rule service unreachable: connection refused");

        let empty = UpstreamError::Status {
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(empty.message(), GENERIC_ERROR_MESSAGE);
    }
}
