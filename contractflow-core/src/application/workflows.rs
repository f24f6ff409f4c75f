//! Approval template management and routing preview

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::domain::contract::{ContractStatus, IContractRepository};
use crate::domain::directory::IUserRepository;
use crate::domain::workflow::{
    self, ApprovalPlan, IWorkflowRepository, PlanSubject, Workflow, WorkflowError, WorkflowId,
    WorkflowStep,
};

/// Everything an administrator supplies for a template
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDefinition {
    pub name: String,
    pub description: Option<String>,
    pub contract_type: Option<String>,
    pub is_default: bool,
    pub active: bool,
    pub steps: Vec<WorkflowStep>,
}

/// Hypothetical contract used to preview routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub contract_type: String,
    pub amount_cents: i64,
    pub department: Option<String>,
}

/// Workflow template use cases
#[derive(Clone)]
pub struct WorkflowTemplateService {
    workflows: Arc<dyn IWorkflowRepository>,
    contracts: Arc<dyn IContractRepository>,
    users: Arc<dyn IUserRepository>,
}

impl WorkflowTemplateService {
    pub fn new(
        workflows: Arc<dyn IWorkflowRepository>,
        contracts: Arc<dyn IContractRepository>,
        users: Arc<dyn IUserRepository>,
    ) -> Self {
        Self {
            workflows,
            contracts,
            users,
        }
    }

    #[instrument(skip(self, definition), fields(name = %definition.name))]
    pub async fn create(&self, definition: WorkflowDefinition) -> Result<Workflow, WorkflowError> {
        let mut workflow = Workflow::new(
            definition.name,
            definition.description,
            definition.contract_type,
            definition.is_default,
            definition.steps,
        );
        workflow.active = definition.active;
        workflow.validate()?;

        self.workflows.create(&workflow).await?;
        info!(workflow_id = %workflow.id, "Workflow created");
        Ok(workflow)
    }

    /// Replace a template's definition, keeping its identity
    #[instrument(skip(self, definition), fields(workflow_id = %id))]
    pub async fn update(
        &self,
        id: &WorkflowId,
        definition: WorkflowDefinition,
    ) -> Result<Workflow, WorkflowError> {
        let existing = self.get(id).await?;

        let mut workflow = Workflow::new(
            definition.name,
            definition.description,
            definition.contract_type,
            definition.is_default,
            definition.steps,
        );
        workflow.id = existing.id;
        workflow.created_at = existing.created_at;
        workflow.active = definition.active;
        workflow.validate()?;

        self.workflows.update(&workflow).await?;
        Ok(workflow)
    }

    pub async fn get(&self, id: &WorkflowId) -> Result<Workflow, WorkflowError> {
        self.workflows
            .find_by_id(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound { id: id.to_string() })
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<Workflow>, WorkflowError> {
        self.workflows.list(active_only).await
    }

    /// Delete a template no contract is currently being routed through
    #[instrument(skip(self), fields(workflow_id = %id))]
    pub async fn delete(&self, id: &WorkflowId) -> Result<(), WorkflowError> {
        self.get(id).await?;

        let in_flight = self
            .contracts
            .count_with_workflow(id, ContractStatus::PendingApproval)
            .await
            .map_err(|e| {
                error!("Failed to count contracts using workflow {}: {}", id, e);
                WorkflowError::DatabaseError {
                    message: e.to_string(),
                }
            })?;
        if in_flight > 0 {
            return Err(WorkflowError::InUse {
                id: id.to_string(),
                contracts: in_flight,
            });
        }

        self.workflows.delete(id).await?;
        info!(workflow_id = %id, "Workflow deleted");
        Ok(())
    }

    /// The plan a contract with these attributes would receive right now
    #[instrument(skip(self))]
    pub async fn preview(&self, request: &PreviewRequest) -> Result<ApprovalPlan, WorkflowError> {
        let workflows = self.workflows.list(true).await?;
        let selected = workflow::select_workflow(&workflows, &request.contract_type)?;

        let subject = PlanSubject {
            contract_type: request.contract_type.clone(),
            amount_cents: request.amount_cents,
            department: request.department.clone(),
            created_by: None,
        };
        let plan = workflow::plan(selected, &subject, self.users.as_ref()).await?;

        info!(
            workflow_id = %plan.workflow_id,
            stages = plan.stages.len(),
            "Workflow preview computed"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::{Contract, ContractNumber, ContractTerms, Money};
    use crate::domain::directory::{IUserRepository, User, UserId};
    use crate::domain::workflow::{ApprovalMode, ApproverSpec, StepCondition};
    use crate::infrastructure::Repositories;
    use chrono::NaiveDate;

    fn service(repos: &Repositories) -> WorkflowTemplateService {
        WorkflowTemplateService::new(
            repos.workflows.clone(),
            repos.contracts.clone(),
            repos.users.clone(),
        )
    }

    fn definition(name: &str) -> WorkflowDefinition {
        WorkflowDefinition {
            name: name.to_string(),
            description: None,
            contract_type: None,
            is_default: true,
            active: true,
            steps: vec![
                WorkflowStep {
                    step_order: 1,
                    name: "Legal".to_string(),
                    approvers: vec![ApproverSpec::Role {
                        role: "legal".to_string(),
                    }],
                    mode: ApprovalMode::Any,
                    condition: None,
                },
                WorkflowStep {
                    step_order: 2,
                    name: "Finance".to_string(),
                    approvers: vec![ApproverSpec::Role {
                        role: "finance".to_string(),
                    }],
                    mode: ApprovalMode::All,
                    condition: Some(StepCondition {
                        min_amount_cents: Some(1_000_000),
                        max_amount_cents: None,
                        contract_types: Vec::new(),
                    }),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_create_validates_and_rejects_duplicate_names() {
        let repos = Repositories::in_memory();
        let service = service(&repos);

        let mut bad = definition("Standard");
        bad.steps.clear();
        assert!(matches!(
            service.create(bad).await,
            Err(WorkflowError::InvalidDefinition { .. })
        ));

        service.create(definition("Standard")).await.unwrap();
        assert!(matches!(
            service.create(definition("standard")).await,
            Err(WorkflowError::NameAlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let created = service.create(definition("Standard")).await.unwrap();

        let mut changed = definition("Standard v2");
        changed.active = false;
        let updated = service.update(&created.id, changed).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(!updated.active);
        assert!(service.list(true).await.unwrap().is_empty());
        assert_eq!(service.list(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_blocked_while_contracts_pending() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let workflow = service.create(definition("Standard")).await.unwrap();

        let terms = ContractTerms {
            title: "Lease".to_string(),
            description: None,
            counterparty: "Initech".to_string(),
            contract_type: "lease".to_string(),
            department: None,
            value: Money::new(100, "USD").unwrap(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };
        let mut contract = Contract::new(
            ContractNumber::new("LEASE-1").unwrap(),
            terms,
            UserId::generate(),
        );
        contract.status = ContractStatus::PendingApproval;
        contract.workflow_id = Some(workflow.id);
        repos.contracts.create(&contract).await.unwrap();

        assert!(matches!(
            service.delete(&workflow.id).await,
            Err(WorkflowError::InUse { contracts: 1, .. })
        ));

        contract.status = ContractStatus::Approved;
        repos.contracts.update(&contract).await.unwrap();
        service.delete(&workflow.id).await.unwrap();
        assert!(service.get(&workflow.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_preview_applies_amount_conditions() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let legal = User::new("Lee", "lee@example.com", "legal", None);
        let finance = User::new("Fay", "fay@example.com", "finance", None);
        repos.users.create(&legal).await.unwrap();
        repos.users.create(&finance).await.unwrap();
        service.create(definition("Standard")).await.unwrap();

        let small = service
            .preview(&PreviewRequest {
                contract_type: "nda".to_string(),
                amount_cents: 500,
                department: None,
            })
            .await
            .unwrap();
        assert_eq!(small.stages.len(), 1);
        assert_eq!(small.stages[0].approvers, vec![legal.id]);

        let large = service
            .preview(&PreviewRequest {
                contract_type: "nda".to_string(),
                amount_cents: 2_000_000,
                department: None,
            })
            .await
            .unwrap();
        assert_eq!(large.stages.len(), 2);
        assert_eq!(large.stages[1].approvers, vec![finance.id]);
    }

    #[tokio::test]
    async fn test_preview_without_templates() {
        let repos = Repositories::in_memory();
        let err = service(&repos)
            .preview(&PreviewRequest {
                contract_type: "nda".to_string(),
                amount_cents: 0,
                department: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NoApplicableWorkflow { .. }));
    }
}
