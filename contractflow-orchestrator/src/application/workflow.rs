//! Approval Workflow: the centralised controller for contract approval routing.
//!
//! Submission, withdrawal and every approver decision go through
//! [`ApprovalWorkflow`]. It plans the approval stages, persists approval
//! records, moves the contract through its lifecycle and notifies the people
//! who need to act. Calls touching the same contract are serialized within
//! the process.
//!
//! ```text
//! Controller        ApprovalWorkflow        Engine          Repositories
//!     │                    │                   │                  │
//!     ├─ submit() ────────►│── select + plan ─►│                  │
//!     │                    │── create approvals ─────────────────►│
//!     │                    │── transition ───────────────────────►│
//!     │◄── Contract ───────┤                   │                  │
//!     │                    │                   │                  │
//!     ├─ decide() ────────►│── decide record   │                  │
//!     │                    │── advance ───────►│                  │
//!     │                    │── update approvals ─────────────────►│
//!     │                    │── derive outcome ►│                  │
//!     │                    │── final transition ─────────────────►│
//!     │◄── DecisionResult ─┤                   │                  │
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, instrument, warn};

use contractflow_core::application::{NotificationService, load_contract, record_transition};
use contractflow_core::domain::approval::{
    Approval, ApprovalId, ApprovalOutcome, ApprovalStatus, Decision, IApprovalRepository,
    advance, apply_changes, current_round, derive_outcome, materialize,
};
use contractflow_core::domain::contract::{
    Contract, ContractError, ContractId, ContractStatus, HistoryAction, IContractRepository,
};
use contractflow_core::domain::directory::{IUserRepository, UserId};
use contractflow_core::domain::notification::NotificationKind;
use contractflow_core::domain::workflow::{
    IWorkflowRepository, PlanSubject, plan, select_workflow,
};

/// What a decision did to the submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub approval: Approval,
    pub outcome: ApprovalOutcome,
    pub contract_status: ContractStatus,
}

/// One async lock per contract with operations in flight
#[derive(Clone, Default)]
struct ContractLocks {
    inner: Arc<Mutex<HashMap<ContractId, Arc<AsyncMutex<()>>>>>,
}

impl ContractLocks {
    async fn acquire(&self, id: ContractId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Centralised approval lifecycle controller.
///
/// Controllers call `ApprovalWorkflow` instead of touching approval records
/// or the contract status directly.
#[derive(Clone)]
pub struct ApprovalWorkflow {
    contracts: Arc<dyn IContractRepository>,
    workflows: Arc<dyn IWorkflowRepository>,
    approvals: Arc<dyn IApprovalRepository>,
    users: Arc<dyn IUserRepository>,
    notifications: NotificationService,
    locks: ContractLocks,
}

impl ApprovalWorkflow {
    pub fn new(
        contracts: Arc<dyn IContractRepository>,
        workflows: Arc<dyn IWorkflowRepository>,
        approvals: Arc<dyn IApprovalRepository>,
        users: Arc<dyn IUserRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            contracts,
            workflows,
            approvals,
            users,
            notifications,
            locks: ContractLocks::default(),
        }
    }

    // ── Transition helpers ───────────────────────────────────────────

    /// Route a draft contract into approval.
    ///
    /// A plan without stages approves the contract straight away.
    #[instrument(skip(self), fields(contract_id = %id, actor = %actor))]
    pub async fn submit(&self, id: &ContractId, actor: UserId) -> Result<Contract, ContractError> {
        let _guard = self.locks.acquire(*id).await;
        let mut contract = load_contract(self.contracts.as_ref(), id).await?;
        if !contract.is_creator(&actor) {
            return Err(ContractError::permission_denied(
                "only the contract creator can submit it",
            ));
        }
        if !contract.status.can_transition_to(&ContractStatus::PendingApproval) {
            return Err(ContractError::InvalidTransition {
                from: contract.status,
                to: ContractStatus::PendingApproval,
            });
        }

        let workflows = self.workflows.list(true).await?;
        let workflow = select_workflow(&workflows, &contract.contract_type)?;
        let approval_plan = plan(workflow, &PlanSubject::from(&contract), self.users.as_ref()).await?;

        let round = self
            .approvals
            .list_for_contract(id)
            .await?
            .iter()
            .map(|a| a.round)
            .max()
            .unwrap_or(0)
            + 1;

        // A failed insert must leave the contract in draft
        let records = materialize(&approval_plan, contract.id, round);
        if !records.is_empty() {
            self.approvals.create_many(&records).await?;
        }

        contract.workflow_id = Some(approval_plan.workflow_id);
        let submitted = record_transition(
            self.contracts.as_ref(),
            &mut contract,
            ContractStatus::PendingApproval,
            HistoryAction::Submitted,
            Some(actor),
            Some(format!("Routed via '{}'", approval_plan.workflow_name)),
        )
        .await;
        if let Err(e) = submitted {
            self.cancel_open(records).await;
            return Err(e);
        }

        if approval_plan.is_empty() {
            record_transition(
                self.contracts.as_ref(),
                &mut contract,
                ContractStatus::Approved,
                HistoryAction::Approved,
                None,
                Some("No approval steps apply".to_string()),
            )
            .await?;
            self.notify_owner(&contract, NotificationKind::ContractApproved, None)
                .await;
            return Ok(contract);
        }

        self.notify_pending(&contract, records.iter()).await;

        info!(
            workflow_id = %approval_plan.workflow_id,
            round,
            stages = approval_plan.stages.len(),
            approvals = records.len(),
            "Contract submitted for approval"
        );
        Ok(contract)
    }

    /// Pull a contract back out of approval; open approvals are cancelled
    #[instrument(skip(self), fields(contract_id = %id, actor = %actor))]
    pub async fn withdraw(&self, id: &ContractId, actor: UserId) -> Result<Contract, ContractError> {
        let _guard = self.locks.acquire(*id).await;
        let mut contract = load_contract(self.contracts.as_ref(), id).await?;
        if !contract.is_creator(&actor) {
            return Err(ContractError::permission_denied(
                "only the contract creator can withdraw it",
            ));
        }
        if contract.status != ContractStatus::PendingApproval {
            return Err(ContractError::InvalidTransition {
                from: contract.status,
                to: ContractStatus::Draft,
            });
        }

        record_transition(
            self.contracts.as_ref(),
            &mut contract,
            ContractStatus::Draft,
            HistoryAction::Withdrawn,
            Some(actor),
            None,
        )
        .await?;

        let cancelled = current_round(&self.approvals.list_for_contract(id).await?)
            .into_iter()
            .filter(|a| a.status.is_open())
            .map(|mut a| {
                a.status = ApprovalStatus::Cancelled;
                a
            })
            .collect::<Vec<_>>();
        self.approvals.update_many(&cancelled).await?;

        info!(cancelled = cancelled.len(), "Contract withdrawn from approval");
        Ok(contract)
    }

    /// Record an approver's decision and move the submission forward
    #[instrument(skip(self, comment), fields(approval_id = %approval_id, actor = %actor))]
    pub async fn decide(
        &self,
        approval_id: &ApprovalId,
        actor: UserId,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<DecisionResult, ContractError> {
        let approval = self
            .approvals
            .find_by_id(approval_id)
            .await?
            .ok_or_else(|| ContractError::ApprovalNotFound {
                id: approval_id.to_string(),
            })?;
        if approval.approver_id != actor {
            return Err(ContractError::permission_denied(
                "approval is assigned to another user",
            ));
        }

        // Sibling decisions must see each other before the stage is advanced
        let _guard = self.locks.acquire(approval.contract_id).await;
        let mut contract = load_contract(self.contracts.as_ref(), &approval.contract_id).await?;
        if contract.status != ContractStatus::PendingApproval {
            return Err(ContractError::ApprovalNotActionable {
                id: approval.id.to_string(),
                status: approval.status.to_string(),
            });
        }

        let mut round = current_round(&self.approvals.list_for_contract(&contract.id).await?);
        let Some(record) = round.iter_mut().find(|a| a.id == approval.id) else {
            return Err(ContractError::ApprovalNotActionable {
                id: approval.id.to_string(),
                status: "superseded".to_string(),
            });
        };
        record.decide(decision, comment)?;
        let approval = record.clone();

        let changes = advance(&round);
        apply_changes(&mut round, &changes);

        let mut touched = vec![approval.clone()];
        touched.extend(
            round
                .iter()
                .filter(|a| changes.iter().any(|c| c.approval_id == a.id))
                .cloned(),
        );
        self.approvals.update_many(&touched).await?;

        let step_action = match decision {
            Decision::Approve => HistoryAction::StepApproved,
            Decision::Reject => HistoryAction::StepRejected,
        };
        let step_note = match &approval.comment {
            Some(comment) => format!("{}: {}", approval.step_name, comment),
            None => approval.step_name.clone(),
        };
        self.contracts
            .append_history(&contract.record(step_action, Some(actor), Some(step_note)))
            .await?;

        let outcome = derive_outcome(&round);
        match outcome {
            ApprovalOutcome::Approved => {
                record_transition(
                    self.contracts.as_ref(),
                    &mut contract,
                    ContractStatus::Approved,
                    HistoryAction::Approved,
                    Some(actor),
                    None,
                )
                .await?;
                self.notify_owner(&contract, NotificationKind::ContractApproved, None)
                    .await;
            }
            ApprovalOutcome::Rejected { step } => {
                record_transition(
                    self.contracts.as_ref(),
                    &mut contract,
                    ContractStatus::Rejected,
                    HistoryAction::Rejected,
                    Some(actor),
                    approval.comment.clone(),
                )
                .await?;
                self.notify_owner(
                    &contract,
                    NotificationKind::ContractRejected,
                    Some(format!(
                        "Rejected at step {} ({}): {}",
                        step,
                        approval.step_name,
                        approval.comment.as_deref().unwrap_or_default()
                    )),
                )
                .await;
            }
            ApprovalOutcome::InProgress { .. } => {
                let opened = round.iter().filter(|a| {
                    changes
                        .iter()
                        .any(|c| c.approval_id == a.id && c.status == ApprovalStatus::Pending)
                });
                self.notify_pending(&contract, opened).await;
            }
        }

        info!(?outcome, contract_status = %contract.status, "Approval decision recorded");
        Ok(DecisionResult {
            approval,
            outcome,
            contract_status: contract.status,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Every approval record of the contract, all rounds
    pub async fn list_for_contract(&self, id: &ContractId) -> Result<Vec<Approval>, ContractError> {
        load_contract(self.contracts.as_ref(), id).await?;
        self.approvals.list_for_contract(id).await
    }

    /// Approvals waiting on `user`, longest waiting first
    pub async fn pending_for(&self, user: &UserId) -> Result<Vec<Approval>, ContractError> {
        self.approvals
            .list_for_approver(user, ApprovalStatus::Pending)
            .await
    }

    /// Undo the records of a submission whose transition failed
    async fn cancel_open(&self, mut records: Vec<Approval>) {
        if records.is_empty() {
            return;
        }
        for record in &mut records {
            record.status = ApprovalStatus::Cancelled;
        }
        if let Err(e) = self.approvals.update_many(&records).await {
            warn!(error = %e, approvals = records.len(), "Failed to cancel approvals of an aborted submission");
        }
    }

    // ── Notifications ────────────────────────────────────────────────

    async fn notify_pending<'a>(
        &self,
        contract: &Contract,
        approvals: impl Iterator<Item = &'a Approval>,
    ) {
        for approval in approvals.filter(|a| a.status == ApprovalStatus::Pending) {
            self.notifications
                .notify_or_warn(
                    approval.approver_id,
                    NotificationKind::ApprovalRequested,
                    contract,
                    format!("Approval requested: {}", contract.contract_number),
                    format!(
                        "'{}' with {} awaits your decision at step '{}'.",
                        contract.title, contract.counterparty, approval.step_name
                    ),
                )
                .await;
        }
    }

    async fn notify_owner(&self, contract: &Contract, kind: NotificationKind, detail: Option<String>) {
        let (title, default_message) = match kind {
            NotificationKind::ContractRejected => (
                format!("Contract {} rejected", contract.contract_number),
                format!("'{}' was rejected.", contract.title),
            ),
            _ => (
                format!("Contract {} approved", contract.contract_number),
                format!("'{}' passed every approval step.", contract.title),
            ),
        };
        self.notifications
            .notify_or_warn(
                contract.created_by,
                kind,
                contract,
                title,
                detail.unwrap_or(default_message),
            )
            .await;
    }
}
