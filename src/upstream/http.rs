//! HTTP client for the upstream rule service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{FixtureRuleService, RuleService, ServiceMode, ServiceStatus, UpstreamError};
use crate::models::{
    DocumentClass, Hierarchy, Level, ReportFilters, Rule, RuleAssignment, RulesReport,
};

/// Body of `PUT /rules/{level}/{id}`.
#[derive(Debug, Serialize)]
struct RuleUpdateBody {
    rule: Rule,
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<u32>,
}

impl From<RuleAssignment> for RuleUpdateBody {
    fn from(assignment: RuleAssignment) -> Self {
        Self {
            rule: assignment.rule,
            days: match assignment.rule {
                Rule::Restricted => assignment.restriction_days,
                _ => None,
            },
        }
    }
}

/// Rule service reached over HTTP.
///
/// When a fallback is configured, reads that fail at the transport level are
/// answered from the fixture dataset. Writes are never answered locally.
pub struct HttpRuleService {
    client: Client,
    base_url: Url,
    fallback: Option<FixtureRuleService>,
}

impl HttpRuleService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| UpstreamError::Transport(format!("Invalid rule service URL {}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Transport(format!(
                "Rule service URL {} cannot carry a path",
                raw
            )));
        }

        Ok(Self {
            client,
            base_url,
            fallback: None,
        })
    }

    pub fn with_fallback(mut self, fallback: FixtureRuleService) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Endpoint URL with each segment percent-encoded, so ids cannot escape
    /// their path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: Option<&ReportFilters>,
    ) -> Result<T, UpstreamError> {
        let mut request = self.client.get(url.clone());
        if let Some(filters) = query {
            request = request.query(filters);
        }

        let response = request.send().await.map_err(transport_error)?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Log and return the fallback when `err` is a transport failure.
    fn fallback_for(&self, url: &Url, err: &UpstreamError) -> Option<&FixtureRuleService> {
        if !err.is_transport() {
            return None;
        }
        let fallback = self.fallback.as_ref()?;
        tracing::warn!(
            "Rule service not available at {} ({}). Serving fixture data for {}",
            self.base_url(),
            err,
            url.path()
        );
        Some(fallback)
    }
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    if err.is_decode() {
        UpstreamError::Decode(err.to_string())
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

/// Turn a non-2xx response into [`UpstreamError::Status`].
async fn check_status(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body)
        .unwrap_or_else(|| format!("HTTP error, status {}", status.as_u16()));

    Err(UpstreamError::Status {
        status: status.as_u16(),
        message,
    })
}

/// `message` field of a JSON error body. Validation errors may carry a list
/// of messages, which are joined.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        serde_json::Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(|item| item.as_str()).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

#[async_trait]
impl RuleService for HttpRuleService {
    async fn list_classes(&self) -> Result<Hierarchy, UpstreamError> {
        let url = self.url(&["document-classes"]);
        match self.get_json::<Hierarchy>(&url, None).await {
            Ok(tree) => Ok(tree),
            Err(err) => match self.fallback_for(&url, &err) {
                Some(fallback) => fallback.list_classes().await,
                None => Err(err),
            },
        }
    }

    async fn get_class(&self, id: &str) -> Result<DocumentClass, UpstreamError> {
        let url = self.url(&["document-classes", id]);
        match self.get_json::<DocumentClass>(&url, None).await {
            Ok(class) => Ok(class),
            Err(err) => match self.fallback_for(&url, &err) {
                Some(fallback) => fallback.get_class(id).await,
                None => Err(err),
            },
        }
    }

    async fn update_rule(
        &self,
        level: Level,
        id: &str,
        assignment: RuleAssignment,
    ) -> Result<(), UpstreamError> {
        let url = self.url(&["rules", level.as_str(), id]);
        tracing::debug!("PUT {} rule={}", url, assignment.rule.as_str());

        let response = self
            .client
            .put(url)
            .json(&RuleUpdateBody::from(assignment))
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await?;

        Ok(())
    }

    async fn rules_report(&self, filters: &ReportFilters) -> Result<RulesReport, UpstreamError> {
        let url = self.url(&["rules", "report"]);
        let query = (!filters.is_empty()).then_some(filters);
        match self.get_json::<RulesReport>(&url, query).await {
            Ok(report) => Ok(report),
            Err(err) => match self.fallback_for(&url, &err) {
                Some(fallback) => fallback.rules_report(filters).await,
                None => Err(err),
            },
        }
    }

    async fn status(&self) -> ServiceStatus {
        let (available, unreachable) =
            match self.client.get(self.url(&["document-classes"])).send().await {
                Ok(response) => (response.status().is_success(), false),
                Err(err) => {
                    tracing::debug!("Rule service status check failed: {}", err);
                    (false, true)
                }
            };

        ServiceStatus {
            mode: ServiceMode::Live,
            upstream_url: Some(self.base_url().to_string()),
            available,
            fallback_active: unreachable && self.fallback.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_variants() {
        assert_eq!(
            extract_message(r#"{"message":"Regra inválida","statusCode":400}"#),
            Some("Regra inválida".to_string())
        );
        assert_eq!(
            extract_message(r#"{"message":["days must be positive","rule must be set"]}"#),
            Some("days must be positive; rule must be set".to_string())
        );
        assert_eq!(extract_message(r#"{"error":"Bad Request"}"#), None);
        assert_eq!(extract_message("<html>502</html>"), None);
    }

    #[test]
    fn test_update_body_only_carries_days_for_restricted() {
        let restricted =
            serde_json::to_value(RuleUpdateBody::from(RuleAssignment::new(Rule::Restricted, Some(45))))
                .unwrap();
        assert_eq!(restricted, serde_json::json!({ "rule": "RESTRICTED", "days": 45 }));

        let allowed =
            serde_json::to_value(RuleUpdateBody::from(RuleAssignment::new(Rule::Allowed, Some(45))))
                .unwrap();
        assert_eq!(allowed, serde_json::json!({ "rule": "ALLOWED" }));
    }

    #[test]
    fn test_ids_stay_inside_their_path_segment() {
        let service = HttpRuleService::new("http://rules.local:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(service.base_url(), "http://rules.local:3001");

        let url = service.url(&["rules", "label", "a/b?c#d"]);
        assert_eq!(url.as_str(), "http://rules.local:3001/rules/label/a%2Fb%3Fc%23d");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());

        let nested = HttpRuleService::new("http://rules.local/api", Duration::from_secs(1)).unwrap();
        assert_eq!(
            nested.url(&["document-classes", "1"]).as_str(),
            "http://rules.local/api/document-classes/1"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(HttpRuleService::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpRuleService::new("mailto:rules@example.com", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_falls_back_for_reads_only() {
        // Grab a free port, then close it so connections are refused.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = HttpRuleService::new(format!("http://{}", addr), Duration::from_secs(2))
            .unwrap()
            .with_fallback(FixtureRuleService::demo());

        let tree = service.list_classes().await.unwrap();
        assert_eq!(tree.classes.len(), 3);

        let err = service
            .update_rule(Level::Class, "1", RuleAssignment::new(Rule::Allowed, None))
            .await
            .unwrap_err();
        assert!(err.is_transport());

        let status = service.status().await;
        assert!(!status.available);
        assert!(status.fallback_active);
    }
}
