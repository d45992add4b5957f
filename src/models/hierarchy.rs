//! Document hierarchy models: class → type → label.
//!
//! The upstream service is not consistent about field names (`days` vs
//! `restrictionDays`, `types` vs `documentTypes`, `documentTypeId` vs
//! `typeId`). Deserialization goes through private wire structs that accept
//! every variant; serialization always emits the canonical names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Level, Rule};

/// A rule with its optional restriction window, as proposed or persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuleAssignment {
    pub rule: Rule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction_days: Option<u32>,
}

impl RuleAssignment {
    pub fn new(rule: Rule, restriction_days: Option<u32>) -> Self {
        Self {
            rule,
            restriction_days,
        }
    }
}

/// Top level of the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "DocumentClassWire")]
pub struct DocumentClass {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction_days: Option<u32>,
    pub document_types: Vec<DocumentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Intermediate level, owned by a class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "DocumentTypeWire")]
pub struct DocumentType {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_class_id: Option<String>,
    pub labels: Vec<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Leaf level, owned by a type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "LabelWire")]
pub struct Label {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentClassWire {
    id: String,
    name: String,
    #[serde(default)]
    rule: Option<Rule>,
    #[serde(default)]
    restriction_days: Option<i64>,
    #[serde(default)]
    days: Option<i64>,
    #[serde(default)]
    document_types: Option<Vec<DocumentType>>,
    #[serde(default)]
    types: Option<Vec<DocumentType>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentTypeWire {
    id: String,
    name: String,
    #[serde(default)]
    rule: Option<Rule>,
    #[serde(default)]
    restriction_days: Option<i64>,
    #[serde(default)]
    days: Option<i64>,
    #[serde(default)]
    document_class_id: Option<String>,
    #[serde(default)]
    labels: Option<Vec<Label>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelWire {
    id: String,
    name: String,
    #[serde(default)]
    rule: Option<Rule>,
    #[serde(default)]
    restriction_days: Option<i64>,
    #[serde(default)]
    days: Option<i64>,
    #[serde(default)]
    type_id: Option<String>,
    #[serde(default)]
    document_type_id: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// First positive day count among the accepted field names.
pub(super) fn normalize_days(restriction_days: Option<i64>, days: Option<i64>) -> Option<u32> {
    let positive = |d: Option<i64>| d.filter(|d| *d > 0).and_then(|d| u32::try_from(d).ok());
    positive(restriction_days).or_else(|| positive(days))
}

impl From<DocumentClassWire> for DocumentClass {
    fn from(wire: DocumentClassWire) -> Self {
        let mut document_types = wire.document_types.or(wire.types).unwrap_or_default();
        for doc_type in &mut document_types {
            if doc_type.document_class_id.is_none() {
                doc_type.document_class_id = Some(wire.id.clone());
            }
        }

        Self {
            restriction_days: normalize_days(wire.restriction_days, wire.days),
            id: wire.id,
            name: wire.name,
            rule: wire.rule,
            document_types,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

impl From<DocumentTypeWire> for DocumentType {
    fn from(wire: DocumentTypeWire) -> Self {
        let mut labels = wire.labels.unwrap_or_default();
        for label in &mut labels {
            if label.type_id.is_none() {
                label.type_id = Some(wire.id.clone());
            }
        }

        Self {
            restriction_days: normalize_days(wire.restriction_days, wire.days),
            id: wire.id,
            name: wire.name,
            rule: wire.rule,
            document_class_id: wire.document_class_id,
            labels,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

impl From<LabelWire> for Label {
    fn from(wire: LabelWire) -> Self {
        Self {
            restriction_days: normalize_days(wire.restriction_days, wire.days),
            id: wire.id,
            name: wire.name,
            rule: wire.rule,
            type_id: wire.type_id.or(wire.document_type_id),
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

/// Borrowed view of any entity in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef<'a> {
    pub level: Level,
    pub id: &'a str,
    pub name: &'a str,
    pub rule: Option<Rule>,
    pub restriction_days: Option<u32>,
}

/// Result of classifying an id against the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    Missing,
    Found(EntityRef<'a>),
    /// The id occurs at more than one place; holds the levels in search order.
    Ambiguous(Vec<Level>),
}

/// A full tree snapshot, in upstream display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Hierarchy {
    pub classes: Vec<DocumentClass>,
}

impl Hierarchy {
    pub fn new(classes: Vec<DocumentClass>) -> Self {
        Self { classes }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class(&self, id: &str) -> Option<&DocumentClass> {
        self.classes.iter().find(|c| c.id == id)
    }

    /// Every type together with its owning class.
    pub fn types(&self) -> impl Iterator<Item = (&DocumentClass, &DocumentType)> {
        self.classes
            .iter()
            .flat_map(|c| c.document_types.iter().map(move |t| (c, t)))
    }

    /// Every label together with its owning type and class.
    pub fn labels(&self) -> impl Iterator<Item = (&DocumentClass, &DocumentType, &Label)> {
        self.types()
            .flat_map(|(c, t)| t.labels.iter().map(move |l| (c, t, l)))
    }

    /// Every entity, classes first, then types, then labels.
    pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
        let classes = self.classes.iter().map(|c| EntityRef {
            level: Level::Class,
            id: &c.id,
            name: &c.name,
            rule: c.rule,
            restriction_days: c.restriction_days,
        });
        let types = self.types().map(|(_, t)| EntityRef {
            level: Level::Type,
            id: &t.id,
            name: &t.name,
            rule: t.rule,
            restriction_days: t.restriction_days,
        });
        let labels = self.labels().map(|(_, _, l)| EntityRef {
            level: Level::Label,
            id: &l.id,
            name: &l.name,
            rule: l.rule,
            restriction_days: l.restriction_days,
        });
        classes.chain(types).chain(labels)
    }

    /// First entity with this id, searching classes, then types, then labels.
    pub fn find(&self, id: &str) -> Option<EntityRef<'_>> {
        self.entities().find(|e| e.id == id)
    }

    /// Classify an id, reporting ids that occur more than once.
    pub fn lookup(&self, id: &str) -> Lookup<'_> {
        let mut matches = self.entities().filter(|e| e.id == id);
        let Some(first) = matches.next() else {
            return Lookup::Missing;
        };
        let rest: Vec<Level> = matches.map(|e| e.level).collect();
        if rest.is_empty() {
            Lookup::Found(first)
        } else {
            let mut levels = vec![first.level];
            levels.extend(rest);
            Lookup::Ambiguous(levels)
        }
    }

    /// Overwrite the persisted rule of one entity. Returns false when the id
    /// does not exist at that level.
    pub fn apply(&mut self, level: Level, id: &str, assignment: RuleAssignment) -> bool {
        let days = match assignment.rule {
            Rule::Restricted => assignment.restriction_days,
            _ => None,
        };
        let slot = match level {
            Level::Class => self
                .classes
                .iter_mut()
                .find(|c| c.id == id)
                .map(|c| (&mut c.rule, &mut c.restriction_days, &mut c.updated_at)),
            Level::Type => self
                .classes
                .iter_mut()
                .flat_map(|c| c.document_types.iter_mut())
                .find(|t| t.id == id)
                .map(|t| (&mut t.rule, &mut t.restriction_days, &mut t.updated_at)),
            Level::Label => self
                .classes
                .iter_mut()
                .flat_map(|c| c.document_types.iter_mut())
                .flat_map(|t| t.labels.iter_mut())
                .find(|l| l.id == id)
                .map(|l| (&mut l.rule, &mut l.restriction_days, &mut l.updated_at)),
        };

        match slot {
            Some((rule, restriction_days, updated_at)) => {
                *rule = Some(assignment.rule);
                *restriction_days = days;
                *updated_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }
}
