//! Shared fixtures for orchestrator integration tests.
//!
//! Everything runs on the in-memory repositories.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use contractflow_core::application::{CreateContractCommand, WorkflowDefinition};
use contractflow_core::config::Config;
use contractflow_core::domain::approval::{Approval, ApprovalId, ApprovalStatus, IApprovalRepository};
use contractflow_core::domain::contract::{Contract, ContractError, ContractId};
use contractflow_core::domain::directory::{User, UserId};
use contractflow_core::domain::notification::{Notification, NotificationKind};
use contractflow_core::domain::workflow::{ApprovalMode, ApproverSpec, StepCondition, Workflow, WorkflowStep};
use contractflow_core::infrastructure::Repositories;
use contractflow_orchestrator::ApprovalWorkflow;
use contractflow_orchestrator::presentation::AppState;

/// A populated test environment
pub struct TestEnv {
    pub state: AppState,
    pub creator: User,
    pub legal: User,
    pub finance_a: User,
    pub finance_b: User,
    pub ops_head: User,
}

impl TestEnv {
    pub async fn new() -> Self {
        let repos = Repositories::in_memory();
        let creator = seed_user(&repos, "Casey Creator", "requester", Some("Operations")).await;
        let legal = seed_user(&repos, "Lee Legal", "legal", None).await;
        let finance_a = seed_user(&repos, "Frankie Finance", "finance", None).await;
        let finance_b = seed_user(&repos, "Fin Backup", "finance", None).await;
        let ops_head = seed_user(&repos, "Olly Ops", "department_head", Some("Operations")).await;

        Self {
            state: AppState::new(repos, Config::default()),
            creator,
            legal,
            finance_a,
            finance_b,
            ops_head,
        }
    }

    pub async fn create_contract(&self, amount_cents: i64) -> Contract {
        self.state
            .services
            .contracts
            .create(contract_command(amount_cents), self.creator.id)
            .await
            .expect("contract should be created")
    }

    pub async fn create_workflow(&self, name: &str, steps: Vec<WorkflowStep>) -> Workflow {
        self.state
            .services
            .workflows
            .create(WorkflowDefinition {
                name: name.to_string(),
                description: None,
                contract_type: None,
                is_default: true,
                active: true,
                steps,
            })
            .await
            .expect("workflow should be created")
    }

    /// Legal (all) then finance (any)
    pub async fn standard_workflow(&self) -> Workflow {
        self.create_workflow(
            "Standard approval",
            vec![
                role_step(1, "Legal review", "legal", ApprovalMode::All),
                role_step(2, "Finance sign-off", "finance", ApprovalMode::Any),
            ],
        )
        .await
    }

    /// A workflow controller sharing this environment but storing approvals in `approvals`
    pub fn workflow_with(&self, approvals: Arc<dyn IApprovalRepository>) -> ApprovalWorkflow {
        let repos = &self.state.repositories;
        ApprovalWorkflow::new(
            repos.contracts.clone(),
            repos.workflows.clone(),
            approvals,
            repos.users.clone(),
            self.state.services.notifications.clone(),
        )
    }

    pub async fn notifications_for(&self, user: &UserId) -> Vec<Notification> {
        self.state
            .services
            .notifications
            .list(user, false, 200)
            .await
            .expect("notifications should list")
    }

    pub async fn has_notification(&self, user: &UserId, kind: NotificationKind) -> bool {
        self.notifications_for(user)
            .await
            .iter()
            .any(|n| n.kind == kind)
    }
}

pub async fn seed_user(
    repos: &Repositories,
    name: &str,
    role: &str,
    department: Option<&str>,
) -> User {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    let user = User::new(name, email, role, department.map(str::to_string));
    repos.users.create(&user).await.expect("user should be created");
    user
}

pub fn contract_command(amount_cents: i64) -> CreateContractCommand {
    let today = Utc::now().date_naive();
    CreateContractCommand {
        contract_number: None,
        title: "Master Services Agreement".to_string(),
        description: Some("Managed hosting".to_string()),
        counterparty: "Acme Corp".to_string(),
        contract_type: "services".to_string(),
        department: Some("Operations".to_string()),
        amount_cents,
        currency: None,
        start_date: today,
        end_date: today + Duration::days(365),
    }
}

pub fn role_step(order: u32, name: &str, role: &str, mode: ApprovalMode) -> WorkflowStep {
    WorkflowStep {
        step_order: order,
        name: name.to_string(),
        approvers: vec![ApproverSpec::Role {
            role: role.to_string(),
        }],
        mode,
        condition: None,
    }
}

/// Step applying only to contracts worth at least `min_amount_cents`
pub fn gated_step(order: u32, name: &str, role: &str, min_amount_cents: i64) -> WorkflowStep {
    WorkflowStep {
        condition: Some(StepCondition {
            min_amount_cents: Some(min_amount_cents),
            max_amount_cents: None,
            contract_types: Vec::new(),
        }),
        ..role_step(order, name, role, ApprovalMode::All)
    }
}

/// Approval store that yields to the scheduler on every call and can refuse inserts
pub struct FlakyApprovals {
    inner: Arc<dyn IApprovalRepository>,
    refuse_inserts: bool,
}

impl FlakyApprovals {
    pub fn yielding(inner: Arc<dyn IApprovalRepository>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            refuse_inserts: false,
        })
    }

    pub fn refusing_inserts(inner: Arc<dyn IApprovalRepository>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            refuse_inserts: true,
        })
    }
}

#[async_trait]
impl IApprovalRepository for FlakyApprovals {
    async fn create_many(&self, approvals: &[Approval]) -> Result<(), ContractError> {
        tokio::task::yield_now().await;
        if self.refuse_inserts {
            return Err(ContractError::DatabaseError {
                message: "connection reset".to_string(),
            });
        }
        self.inner.create_many(approvals).await
    }

    async fn find_by_id(&self, id: &ApprovalId) -> Result<Option<Approval>, ContractError> {
        tokio::task::yield_now().await;
        self.inner.find_by_id(id).await
    }

    async fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Approval>, ContractError> {
        tokio::task::yield_now().await;
        self.inner.list_for_contract(contract_id).await
    }

    async fn list_for_approver(
        &self,
        approver_id: &UserId,
        status: ApprovalStatus,
    ) -> Result<Vec<Approval>, ContractError> {
        tokio::task::yield_now().await;
        self.inner.list_for_approver(approver_id, status).await
    }

    async fn update_many(&self, approvals: &[Approval]) -> Result<(), ContractError> {
        tokio::task::yield_now().await;
        self.inner.update_many(approvals).await
    }

    async fn list_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Approval>, ContractError> {
        tokio::task::yield_now().await;
        self.inner.list_created_between(from, to).await
    }
}
