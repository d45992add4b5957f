//! Rule report models matching the upstream `/rules/report` payload.

use serde::{Deserialize, Serialize};

use super::hierarchy::normalize_days;
use super::{Level, Rule};

/// Totals of entities that carry a rule, per level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_classes: usize,
    pub total_types: usize,
    pub total_labels: usize,
}

/// Minimal `{id, name}` reference to a parent entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParentRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "ReportClassWire")]
pub struct ReportClass {
    pub id: String,
    pub name: String,
    pub rule: Option<Rule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "ReportTypeWire")]
pub struct ReportType {
    pub id: String,
    pub name: String,
    pub rule: Option<Rule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction_days: Option<u32>,
    pub class: ParentRef,
}

/// Type reference carried by a label row, with its own class reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportTypeRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: ParentRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "ReportLabelWire")]
pub struct ReportLabel {
    pub id: String,
    pub name: String,
    pub rule: Option<Rule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction_days: Option<u32>,
    #[serde(rename = "type")]
    pub document_type: ReportTypeRef,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportClassWire {
    id: String,
    name: String,
    #[serde(default)]
    rule: Option<Rule>,
    #[serde(default)]
    restriction_days: Option<i64>,
    #[serde(default)]
    days: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportTypeWire {
    id: String,
    name: String,
    #[serde(default)]
    rule: Option<Rule>,
    #[serde(default)]
    restriction_days: Option<i64>,
    #[serde(default)]
    days: Option<i64>,
    #[serde(default)]
    class: ParentRef,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportLabelWire {
    id: String,
    name: String,
    #[serde(default)]
    rule: Option<Rule>,
    #[serde(default)]
    restriction_days: Option<i64>,
    #[serde(default)]
    days: Option<i64>,
    #[serde(default, rename = "type")]
    document_type: ReportTypeRef,
}

impl From<ReportClassWire> for ReportClass {
    fn from(wire: ReportClassWire) -> Self {
        Self {
            restriction_days: normalize_days(wire.restriction_days, wire.days),
            id: wire.id,
            name: wire.name,
            rule: wire.rule,
        }
    }
}

impl From<ReportTypeWire> for ReportType {
    fn from(wire: ReportTypeWire) -> Self {
        Self {
            restriction_days: normalize_days(wire.restriction_days, wire.days),
            id: wire.id,
            name: wire.name,
            rule: wire.rule,
            class: wire.class,
        }
    }
}

impl From<ReportLabelWire> for ReportLabel {
    fn from(wire: ReportLabelWire) -> Self {
        Self {
            restriction_days: normalize_days(wire.restriction_days, wire.days),
            id: wire.id,
            name: wire.name,
            rule: wire.rule,
            document_type: wire.document_type,
        }
    }
}

/// Upstream rule report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RulesReport {
    #[serde(default)]
    pub summary: ReportSummary,
    #[serde(default)]
    pub classes: Vec<ReportClass>,
    #[serde(default)]
    pub types: Vec<ReportType>,
    #[serde(default)]
    pub labels: Vec<ReportLabel>,
}

/// One flattened report line, as shown in the reports table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub document_class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_name: Option<String>,
    pub rule: Rule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    pub level: Level,
}

/// Report query filters. Also forwarded to the upstream as query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_class: Option<String>,
}

impl ReportFilters {
    pub fn is_empty(&self) -> bool {
        self.rule.is_none() && self.search.is_none() && self.document_class.is_none()
    }
}

/// Response body of the served report endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub summary: ReportSummary,
    pub total_rows: usize,
    pub rows: Vec<ReportRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_rows_prefer_restriction_days() {
        let class: ReportClass = serde_json::from_value(serde_json::json!({
            "id": "2",
            "name": "Documento Bancário",
            "rule": "RESTRICTED",
            "restrictionDays": 30,
            "days": 180
        }))
        .unwrap();
        assert_eq!(class.restriction_days, Some(30));

        let label: ReportLabel = serde_json::from_value(serde_json::json!({
            "id": "2-1-2",
            "name": "Valor do Boleto",
            "rule": "RESTRICTED",
            "restrictionDays": 0,
            "days": 365,
            "type": { "id": "2-1", "name": "Boleto Bancário", "class": { "id": "2", "name": "Documento Bancário" } }
        }))
        .unwrap();
        assert_eq!(label.restriction_days, Some(365));
        assert_eq!(label.document_type.class.name, "Documento Bancário");
    }

    #[test]
    fn test_report_rows_drop_non_positive_days() {
        let zero: ReportClass =
            serde_json::from_str(r#"{"id":"1","name":"A","rule":"RESTRICTED","days":0}"#).unwrap();
        assert_eq!(zero.restriction_days, None);

        let negative: ReportType = serde_json::from_str(
            r#"{"id":"1-1","name":"B","rule":"RESTRICTED","restrictionDays":-1,"class":{"id":"1","name":"A"}}"#,
        )
        .unwrap();
        assert_eq!(negative.restriction_days, None);
        assert_eq!(negative.class.id, "1");
    }

    #[test]
    fn test_report_serializes_one_day_field() {
        let report: RulesReport = serde_json::from_value(serde_json::json!({
            "summary": { "totalClasses": 1, "totalTypes": 0, "totalLabels": 0 },
            "classes": [{ "id": "1", "name": "A", "rule": "RESTRICTED", "days": 15 }]
        }))
        .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["classes"][0]["restrictionDays"], 15);
        assert!(json["classes"][0].get("days").is_none());
    }
}
