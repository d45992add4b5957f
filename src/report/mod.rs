//! Rule report construction and filtering.
//!
//! A report lists every entity that carries a rule, grouped by level. The
//! reports table works on flattened rows which are filtered locally.

use crate::models::{
    Hierarchy, Level, ParentRef, ReportClass, ReportFilters, ReportLabel, ReportRow,
    ReportSummary, ReportType, ReportTypeRef, RulesReport,
};

/// Build the upstream report shape from a tree snapshot.
pub fn build_report(tree: &Hierarchy) -> RulesReport {
    let classes: Vec<ReportClass> = tree
        .classes
        .iter()
        .filter_map(|c| {
            c.rule.map(|rule| ReportClass {
                id: c.id.clone(),
                name: c.name.clone(),
                rule: Some(rule),
                restriction_days: c.restriction_days,
            })
        })
        .collect();

    let types: Vec<ReportType> = tree
        .types()
        .filter_map(|(c, t)| {
            t.rule.map(|rule| ReportType {
                id: t.id.clone(),
                name: t.name.clone(),
                rule: Some(rule),
                restriction_days: t.restriction_days,
                class: ParentRef {
                    id: c.id.clone(),
                    name: c.name.clone(),
                },
            })
        })
        .collect();

    let labels: Vec<ReportLabel> = tree
        .labels()
        .filter_map(|(c, t, l)| {
            l.rule.map(|rule| ReportLabel {
                id: l.id.clone(),
                name: l.name.clone(),
                rule: Some(rule),
                restriction_days: l.restriction_days,
                document_type: ReportTypeRef {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    class: ParentRef {
                        id: c.id.clone(),
                        name: c.name.clone(),
                    },
                },
            })
        })
        .collect();

    RulesReport {
        summary: ReportSummary {
            total_classes: classes.len(),
            total_types: types.len(),
            total_labels: labels.len(),
        },
        classes,
        types,
        labels,
    }
}

/// Flatten a report into table rows: classes, then types, then labels.
/// Items without a rule are skipped.
pub fn flatten(report: &RulesReport) -> Vec<ReportRow> {
    let classes = report.classes.iter().filter_map(|c| {
        c.rule.map(|rule| ReportRow {
            document_class_name: c.name.clone(),
            document_type_name: None,
            label_name: None,
            rule,
            days: c.restriction_days,
            level: Level::Class,
        })
    });

    let types = report.types.iter().filter_map(|t| {
        t.rule.map(|rule| ReportRow {
            document_class_name: t.class.name.clone(),
            document_type_name: Some(t.name.clone()),
            label_name: None,
            rule,
            days: t.restriction_days,
            level: Level::Type,
        })
    });

    let labels = report.labels.iter().filter_map(|l| {
        l.rule.map(|rule| ReportRow {
            document_class_name: l.document_type.class.name.clone(),
            document_type_name: Some(l.document_type.name.clone()),
            label_name: Some(l.name.clone()),
            rule,
            days: l.restriction_days,
            level: Level::Label,
        })
    });

    classes.chain(types).chain(labels).collect()
}

impl ReportFilters {
    /// Whether a row passes every filter that is set.
    pub fn matches(&self, row: &ReportRow) -> bool {
        if let Some(rule) = self.rule {
            if row.rule != rule {
                return false;
            }
        }

        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = |name: Option<&str>| name.is_some_and(|n| n.to_lowercase().contains(&needle));
            if !(hit(Some(&row.document_class_name))
                || hit(row.document_type_name.as_deref())
                || hit(row.label_name.as_deref()))
            {
                return false;
            }
        }

        if let Some(class_name) = self.document_class.as_deref().filter(|s| !s.is_empty()) {
            if row.document_class_name != class_name {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, rows: Vec<ReportRow>) -> Vec<ReportRow> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}
