//! Built-in demonstration dataset and an in-memory rule service over it.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RuleService, ServiceMode, ServiceStatus, UpstreamError};
use crate::models::{
    DocumentClass, DocumentType, Hierarchy, Label, Level, ReportFilters, Rule, RuleAssignment,
    RulesReport,
};
use crate::report;

fn label(id: &str, type_id: &str, name: &str, rule: Option<Rule>, days: Option<u32>) -> Label {
    Label {
        id: id.to_string(),
        name: name.to_string(),
        rule,
        restriction_days: days,
        type_id: Some(type_id.to_string()),
        created_at: None,
        updated_at: None,
    }
}

fn doc_type(
    id: &str,
    class_id: &str,
    name: &str,
    rule: Option<Rule>,
    days: Option<u32>,
    labels: Vec<Label>,
) -> DocumentType {
    DocumentType {
        id: id.to_string(),
        name: name.to_string(),
        rule,
        restriction_days: days,
        document_class_id: Some(class_id.to_string()),
        labels,
        created_at: None,
        updated_at: None,
    }
}

fn class(
    id: &str,
    name: &str,
    rule: Option<Rule>,
    days: Option<u32>,
    document_types: Vec<DocumentType>,
) -> DocumentClass {
    DocumentClass {
        id: id.to_string(),
        name: name.to_string(),
        rule,
        restriction_days: days,
        document_types,
        created_at: None,
        updated_at: None,
    }
}

/// The demonstration tree served when no rule service is available.
pub fn demo_hierarchy() -> Hierarchy {
    use Rule::{Allowed, NotAllowed, Restricted};

    Hierarchy::new(vec![
        class(
            "1",
            "Certidão Civil",
            Some(Allowed),
            None,
            vec![
                doc_type(
                    "1-1",
                    "1",
                    "Certidão de Nascimento",
                    Some(Restricted),
                    Some(30),
                    vec![
                        label("1-1-1", "1-1", "Nome Completo do Titular", Some(NotAllowed), None),
                        label("1-1-2", "1-1", "CPF do Titular", Some(NotAllowed), None),
                        label("1-1-3", "1-1", "Data de Nascimento", Some(Restricted), Some(90)),
                    ],
                ),
                doc_type(
                    "1-2",
                    "1",
                    "Certidão de Casamento",
                    Some(Allowed),
                    None,
                    vec![
                        label("1-2-1", "1-2", "Nome Completo dos Cônjuges", Some(Restricted), Some(60)),
                        label("1-2-2", "1-2", "Data do Casamento", Some(Allowed), None),
                    ],
                ),
            ],
        ),
        class(
            "2",
            "Documento Bancário",
            Some(Restricted),
            Some(180),
            vec![
                doc_type(
                    "2-1",
                    "2",
                    "Boleto Bancário",
                    Some(NotAllowed),
                    None,
                    vec![
                        label("2-1-1", "2-1", "Nome do Pagador", Some(NotAllowed), None),
                        label("2-1-2", "2-1", "Valor do Boleto", Some(Restricted), Some(365)),
                    ],
                ),
                doc_type(
                    "2-2",
                    "2",
                    "Comprovante de Transferência",
                    None,
                    None,
                    vec![label("2-2-1", "2-2", "Valor da Transação", Some(Allowed), None)],
                ),
            ],
        ),
        class(
            "3",
            "Documento Fiscal",
            Some(Allowed),
            None,
            vec![doc_type(
                "3-1",
                "3",
                "Nota Fiscal Eletrônica (NF-e)",
                Some(Allowed),
                None,
                vec![
                    label("3-1-1", "3-1", "Chave de Acesso da NF-e", Some(Allowed), None),
                    label("3-1-2", "3-1", "Nome do Consumidor", Some(Restricted), Some(120)),
                ],
            )],
        ),
    ])
}

/// Rule service backed by an in-memory tree. Updates are applied to the tree,
/// so later reads observe them.
pub struct FixtureRuleService {
    tree: RwLock<Hierarchy>,
}

impl FixtureRuleService {
    pub fn new(tree: Hierarchy) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    pub fn demo() -> Self {
        Self::new(demo_hierarchy())
    }
}

#[async_trait]
impl RuleService for FixtureRuleService {
    async fn list_classes(&self) -> Result<Hierarchy, UpstreamError> {
        Ok(self.tree.read().await.clone())
    }

    async fn get_class(&self, id: &str) -> Result<DocumentClass, UpstreamError> {
        self.tree
            .read()
            .await
            .class(id)
            .cloned()
            .ok_or_else(|| UpstreamError::Status {
                status: 404,
                message: format!("Document class {} not found", id),
            })
    }

    async fn update_rule(
        &self,
        level: Level,
        id: &str,
        assignment: RuleAssignment,
    ) -> Result<(), UpstreamError> {
        if assignment.rule == Rule::Restricted && assignment.restriction_days.is_none() {
            return Err(UpstreamError::Status {
                status: 400,
                message: "Restriction days are required for RESTRICTED rules".to_string(),
            });
        }

        let mut tree = self.tree.write().await;
        if tree.apply(level, id, assignment) {
            tracing::debug!("Fixture rule updated: {} {} -> {}", level, id, assignment.rule.as_str());
            Ok(())
        } else {
            Err(UpstreamError::Status {
                status: 404,
                message: format!("Document {} {} not found", level, id),
            })
        }
    }

    /// Filters are applied by the caller on the flattened rows.
    async fn rules_report(&self, _filters: &ReportFilters) -> Result<RulesReport, UpstreamError> {
        Ok(report::build_report(&*self.tree.read().await))
    }

    async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            mode: ServiceMode::Fixtures,
            upstream_url: None,
            available: true,
            fallback_active: false,
        }
    }
}
