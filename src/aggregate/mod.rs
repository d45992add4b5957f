//! Dashboard statistics derived from a hierarchy snapshot.
//!
//! Everything here is a pure function of the tree: same snapshot in, same
//! numbers out. Nothing is cached.

use serde::Serialize;

use crate::models::{Hierarchy, Level, Rule};

/// Entity totals per level and rule totals across all levels.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuleCounts {
    pub class_count: usize,
    pub type_count: usize,
    pub label_count: usize,
    pub allowed_count: usize,
    pub restricted_count: usize,
    pub blocked_count: usize,
}

impl RuleCounts {
    fn record(&mut self, rule: Option<Rule>) {
        match rule {
            Some(Rule::Allowed) => self.allowed_count += 1,
            Some(Rule::Restricted) => self.restricted_count += 1,
            Some(Rule::NotAllowed) => self.blocked_count += 1,
            None => {}
        }
    }

    /// Number of entities of any level.
    pub fn total_items(&self) -> usize {
        self.class_count + self.type_count + self.label_count
    }

    /// Number of entities with a defined rule.
    pub fn total_rules(&self) -> usize {
        self.allowed_count + self.restricted_count + self.blocked_count
    }

    pub fn count_for(&self, rule: Rule) -> usize {
        match rule {
            Rule::Allowed => self.allowed_count,
            Rule::Restricted => self.restricted_count,
            Rule::NotAllowed => self.blocked_count,
        }
    }
}

/// Walk every class, type and label once.
pub fn compute_counts(tree: &Hierarchy) -> RuleCounts {
    let mut counts = RuleCounts::default();
    for class in &tree.classes {
        counts.class_count += 1;
        counts.record(class.rule);
        for doc_type in &class.document_types {
            counts.type_count += 1;
            counts.record(doc_type.rule);
            for label in &doc_type.labels {
                counts.label_count += 1;
                counts.record(label.rule);
            }
        }
    }
    counts
}

/// `count / total` as a whole percentage, rounded half up and capped at 100.
/// A zero total yields 0.
pub fn compute_percentage(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let (count, total) = (count as u64, total as u64);
    let rounded = (count * 200 + total) / (total * 2);
    rounded.min(100) as u8
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
    Error,
}

/// One dashboard alert.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub count: usize,
}

/// Alerts in fixed order: classes without a rule, restricted types, blocked
/// labels. A category only appears when its count is positive.
pub fn compute_alerts(tree: &Hierarchy) -> Vec<Alert> {
    let classes_without_rule = tree.classes.iter().filter(|c| c.rule.is_none()).count();
    let restricted_types = tree
        .types()
        .filter(|(_, t)| t.rule == Some(Rule::Restricted))
        .count();
    let blocked_labels = tree
        .labels()
        .filter(|(_, _, l)| l.rule == Some(Rule::NotAllowed))
        .count();

    let mut alerts = Vec::with_capacity(3);
    if classes_without_rule > 0 {
        alerts.push(Alert {
            severity: Severity::Warning,
            title: "Classes without rules".to_string(),
            description: format!(
                "{} classes have no anonymization rule defined",
                classes_without_rule
            ),
            count: classes_without_rule,
        });
    }
    if restricted_types > 0 {
        alerts.push(Alert {
            severity: Severity::Info,
            title: "Restricted types".to_string(),
            description: format!("{} types have restrictive rules", restricted_types),
            count: restricted_types,
        });
    }
    if blocked_labels > 0 {
        alerts.push(Alert {
            severity: Severity::Error,
            title: "Blocked labels".to_string(),
            description: format!("{} fields are fully blocked", blocked_labels),
            count: blocked_labels,
        });
    }
    alerts
}

/// Overview cards: counts plus each rule's share of the defined rules.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub counts: RuleCounts,
    pub total_rules: usize,
    pub allowed_percentage: u8,
    pub restricted_percentage: u8,
    pub blocked_percentage: u8,
    pub coverage: Coverage,
}

/// Share of entities that carry a rule.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub defined_rules: usize,
    pub total_items: usize,
    pub percentage: u8,
}

pub fn coverage(counts: &RuleCounts) -> Coverage {
    Coverage {
        defined_rules: counts.total_rules(),
        total_items: counts.total_items(),
        percentage: compute_percentage(counts.total_rules(), counts.total_items()),
    }
}

pub fn overview(tree: &Hierarchy) -> Overview {
    let counts = compute_counts(tree);
    let total_rules = counts.total_rules();
    Overview {
        counts,
        total_rules,
        allowed_percentage: compute_percentage(counts.allowed_count, total_rules),
        restricted_percentage: compute_percentage(counts.restricted_count, total_rules),
        blocked_percentage: compute_percentage(counts.blocked_count, total_rules),
        coverage: coverage(&counts),
    }
}

/// One pie-chart slice.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuleSlice {
    pub rule: Rule,
    pub name: &'static str,
    pub count: usize,
    pub percentage: u8,
}

/// Slices in ALLOWED, RESTRICTED, NOT_ALLOWED order.
pub fn rule_distribution(counts: &RuleCounts) -> Vec<RuleSlice> {
    let total = counts.total_rules();
    Rule::ALL
        .iter()
        .map(|&rule| RuleSlice {
            rule,
            name: rule.display_name(),
            count: counts.count_for(rule),
            percentage: compute_percentage(counts.count_for(rule), total),
        })
        .collect()
}

/// Rule breakdown for one level of the tree.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelDistribution {
    pub level: Level,
    pub allowed: usize,
    pub restricted: usize,
    pub blocked: usize,
}

impl LevelDistribution {
    fn new(level: Level) -> Self {
        Self {
            level,
            allowed: 0,
            restricted: 0,
            blocked: 0,
        }
    }

    fn record(&mut self, rule: Option<Rule>) {
        match rule {
            Some(Rule::Allowed) => self.allowed += 1,
            Some(Rule::Restricted) => self.restricted += 1,
            Some(Rule::NotAllowed) => self.blocked += 1,
            None => {}
        }
    }
}

/// Per-level breakdown in class, type, label order.
pub fn level_distribution(tree: &Hierarchy) -> Vec<LevelDistribution> {
    let mut classes = LevelDistribution::new(Level::Class);
    let mut types = LevelDistribution::new(Level::Type);
    let mut labels = LevelDistribution::new(Level::Label);

    for entity in tree.entities() {
        match entity.level {
            Level::Class => classes.record(entity.rule),
            Level::Type => types.record(entity.rule),
            Level::Label => labels.record(entity.rule),
        }
    }

    vec![classes, types, labels]
}

/// Body of the distribution endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub total_rules: usize,
    pub by_rule: Vec<RuleSlice>,
    pub by_level: Vec<LevelDistribution>,
}

pub fn distribution(tree: &Hierarchy) -> Distribution {
    let counts = compute_counts(tree);
    Distribution {
        total_rules: counts.total_rules(),
        by_rule: rule_distribution(&counts),
        by_level: level_distribution(tree),
    }
}
