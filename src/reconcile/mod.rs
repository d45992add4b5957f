//! Batch edit reconciliation.
//!
//! An [`EditSession`] holds a snapshot of the hierarchy plus an overlay of
//! proposed rule changes keyed by entity id. Edits are merged with the
//! snapshot for display and saved as independent concurrent updates; each
//! outcome is folded back into the overlay on its own.

mod outcome;
mod view;

pub use outcome::{Notice, SaveFailure, SaveReport};
pub use view::SessionView;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::models::{
    parse_days, EntityRef, Hierarchy, Level, Lookup, Rule, RuleAssignment,
    DEFAULT_RESTRICTION_DAYS,
};
use crate::upstream::{RuleService, UpstreamError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("Entity {0} not found in the hierarchy")]
    UnknownEntity(String),

    /// An update task died before reporting an outcome.
    #[error("Save orchestration failed: {0}")]
    Orchestration(String),
}

/// Result of one dispatched update, tagged with what it targeted.
struct UpdateOutcome {
    id: String,
    level: Level,
    name: String,
    result: Result<(), UpstreamError>,
}

/// One editing session: a tree snapshot and the overlay on top of it.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    tree: Hierarchy,
    pending: BTreeMap<String, RuleAssignment>,
    raw_days: HashMap<String, String>,
    errors: HashMap<String, String>,
}

impl EditSession {
    pub fn new(tree: Hierarchy) -> Self {
        Self {
            tree,
            ..Default::default()
        }
    }

    /// The snapshot edits are compared against.
    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    fn original(&self, id: &str) -> Result<EntityRef<'_>, ReconcileError> {
        self.tree
            .find(id)
            .ok_or_else(|| ReconcileError::UnknownEntity(id.to_string()))
    }

    /// Propose a rule. RESTRICTED gets a day count from the typed input, then
    /// the current days, then the default.
    pub fn set_rule(&mut self, id: &str, rule: Rule) -> Result<(), ReconcileError> {
        let original_days = self.original(id)?.restriction_days;

        let restriction_days = match rule {
            Rule::Restricted => {
                let typed = self.raw_days.get(id).and_then(|raw| parse_days(raw));
                let pending_days = self
                    .pending
                    .get(id)
                    .filter(|p| p.rule == Rule::Restricted)
                    .and_then(|p| p.restriction_days);
                Some(
                    typed
                        .or(pending_days)
                        .or(original_days)
                        .unwrap_or(DEFAULT_RESTRICTION_DAYS),
                )
            }
            _ => None,
        };

        self.pending
            .insert(id.to_string(), RuleAssignment::new(rule, restriction_days));
        self.errors.remove(id);
        Ok(())
    }

    /// Record typed day input. The text is always kept; the overlay only
    /// changes for a positive integer while the effective rule is RESTRICTED.
    pub fn set_days(&mut self, id: &str, raw: impl Into<String>) -> Result<(), ReconcileError> {
        let original = self.original(id)?;
        let (original_rule, original_days) = (original.rule, original.restriction_days);

        let raw = raw.into();
        let parsed = parse_days(&raw);
        self.raw_days.insert(id.to_string(), raw);

        let Some(days) = parsed else {
            return Ok(());
        };
        if self.effective_rule(id) != Some(Rule::Restricted) {
            return Ok(());
        }

        let rule_unchanged = self
            .pending
            .get(id)
            .map_or(true, |p| Some(p.rule) == original_rule);

        if Some(days) == original_days && rule_unchanged {
            // Retyping the persisted value is not an edit.
            self.pending.remove(id);
        } else {
            self.pending
                .entry(id.to_string())
                .and_modify(|p| p.restriction_days = Some(days))
                .or_insert_with(|| RuleAssignment::new(Rule::Restricted, Some(days)));
        }
        self.errors.remove(id);
        Ok(())
    }

    pub fn effective_rule(&self, id: &str) -> Option<Rule> {
        match self.pending.get(id) {
            Some(p) => Some(p.rule),
            None => self.tree.find(id).and_then(|e| e.rule),
        }
    }

    pub fn effective_days(&self, id: &str) -> Option<u32> {
        self.pending
            .get(id)
            .and_then(|p| p.restriction_days)
            .or_else(|| self.tree.find(id).and_then(|e| e.restriction_days))
    }

    pub fn pending(&self, id: &str) -> Option<&RuleAssignment> {
        self.pending.get(id)
    }

    pub fn raw_days(&self, id: &str) -> Option<&str> {
        self.raw_days.get(id).map(String::as_str)
    }

    pub fn last_error(&self, id: &str) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drop every trace of an edit for one entity.
    pub fn discard(&mut self, id: &str) -> bool {
        let removed = self.pending.remove(id).is_some();
        let typed = self.raw_days.remove(id).is_some();
        let failed = self.errors.remove(id).is_some();
        removed || typed || failed
    }

    /// Clear the whole overlay.
    pub fn abandon(&mut self) {
        self.pending.clear();
        self.raw_days.clear();
        self.errors.clear();
    }

    /// Dispatch one update per pending edit, wait for every outcome, fold the
    /// outcomes into the overlay and refresh the snapshot once.
    ///
    /// If an update task dies without an outcome the overlay is left as it
    /// was and [`ReconcileError::Orchestration`] is returned.
    pub async fn save(
        &mut self,
        service: Arc<dyn RuleService>,
    ) -> Result<SaveReport, ReconcileError> {
        if self.pending.is_empty() {
            return Ok(SaveReport::default());
        }

        let mut rejected: Vec<(SaveFailure, bool)> = Vec::new();
        let mut tasks: JoinSet<UpdateOutcome> = JoinSet::new();

        for (id, assignment) in &self.pending {
            match self.tree.lookup(id) {
                Lookup::Found(entity) => {
                    let service = Arc::clone(&service);
                    let mut outcome = UpdateOutcome {
                        id: id.clone(),
                        level: entity.level,
                        name: entity.name.to_string(),
                        result: Ok(()),
                    };
                    let assignment = *assignment;
                    tasks.spawn(async move {
                        outcome.result = service
                            .update_rule(outcome.level, &outcome.id, assignment)
                            .await;
                        outcome
                    });
                }
                Lookup::Ambiguous(levels) => {
                    let names: Vec<&str> = levels.iter().map(Level::as_str).collect();
                    tracing::warn!("Refusing to save ambiguous id {} ({:?})", id, names);
                    rejected.push((
                        SaveFailure {
                            id: id.clone(),
                            level: None,
                            name: id.clone(),
                            message: format!(
                                "Id {} is ambiguous: it appears as {}",
                                id,
                                names.join(", ")
                            ),
                        },
                        true,
                    ));
                }
                Lookup::Missing => {
                    rejected.push((
                        SaveFailure {
                            id: id.clone(),
                            level: None,
                            name: id.clone(),
                            message: format!("Entity {} no longer exists", id),
                        },
                        false,
                    ));
                }
            }
        }

        tracing::info!(
            "Saving {} rule edit(s), {} rejected before dispatch",
            tasks.len(),
            rejected.len()
        );

        let mut outcomes = Vec::with_capacity(tasks.len());
        let mut crashed: Option<String> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    tracing::error!("Rule update task failed: {}", err);
                    crashed.get_or_insert_with(|| err.to_string());
                }
            }
        }
        if let Some(reason) = crashed {
            return Err(ReconcileError::Orchestration(reason));
        }

        let mut saved = 0;
        let mut failures = Vec::new();
        for UpdateOutcome {
            id,
            level,
            name,
            result,
        } in outcomes
        {
            match result {
                Ok(()) => {
                    saved += 1;
                    self.pending.remove(&id);
                    self.raw_days.remove(&id);
                    self.errors.remove(&id);
                }
                Err(err) => {
                    let message = err.message();
                    tracing::warn!("Rule update for {} {} failed: {}", level, id, message);
                    self.errors.insert(id.clone(), message.clone());
                    failures.push(SaveFailure {
                        id,
                        level: Some(level),
                        name,
                        message,
                    });
                }
            }
        }

        for (failure, keep) in rejected {
            if keep {
                self.errors.insert(failure.id.clone(), failure.message.clone());
            } else {
                self.pending.remove(&failure.id);
                self.raw_days.remove(&failure.id);
                self.errors.remove(&failure.id);
            }
            failures.push(failure);
        }
        failures.sort_by(|a, b| a.id.cmp(&b.id));

        let refreshed = match service.list_classes().await {
            Ok(tree) => {
                self.tree = tree;
                true
            }
            Err(err) => {
                tracing::warn!("Failed to refresh hierarchy after save: {}", err);
                false
            }
        };

        Ok(SaveReport {
            saved,
            has_errors: !failures.is_empty(),
            failures,
            refreshed,
            remaining: self.pending.len(),
        })
    }
}
