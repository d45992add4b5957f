//! Hierarchy merged with the edit overlay, for display.

use serde::Serialize;

use super::EditSession;
use crate::models::{Level, Rule};

/// Display state of one entity: effective values plus edit markers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntityView {
    pub id: String,
    pub name: String,
    pub level: Level,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction_days: Option<u32>,
    /// What the day input box shows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_input: Option<String>,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeView {
    #[serde(flatten)]
    pub entity: EntityView,
    pub labels: Vec<EntityView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassView {
    #[serde(flatten)]
    pub entity: EntityView,
    pub types: Vec<TypeView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub classes: Vec<ClassView>,
    pub pending_count: usize,
    /// Whether a save can be offered.
    pub has_pending: bool,
    pub error_count: usize,
}

impl EditSession {
    fn entity_view(&self, level: Level, id: &str, name: &str) -> EntityView {
        let restriction_days = self.effective_days(id);
        let days_input = self
            .raw_days(id)
            .map(str::to_string)
            .or_else(|| restriction_days.map(|d| d.to_string()));

        EntityView {
            id: id.to_string(),
            name: name.to_string(),
            level,
            rule: self.effective_rule(id),
            restriction_days,
            days_input,
            pending: self.pending(id).is_some(),
            error: self.last_error(id).map(str::to_string),
        }
    }

    /// The snapshot with every entity showing its effective rule.
    pub fn view(&self) -> SessionView {
        let classes = self
            .tree()
            .classes
            .iter()
            .map(|class| ClassView {
                entity: self.entity_view(Level::Class, &class.id, &class.name),
                types: class
                    .document_types
                    .iter()
                    .map(|doc_type| TypeView {
                        entity: self.entity_view(Level::Type, &doc_type.id, &doc_type.name),
                        labels: doc_type
                            .labels
                            .iter()
                            .map(|label| self.entity_view(Level::Label, &label.id, &label.name))
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        SessionView {
            classes,
            pending_count: self.pending_count(),
            has_pending: self.has_pending(),
            error_count: self.errors.len(),
        }
    }
}
