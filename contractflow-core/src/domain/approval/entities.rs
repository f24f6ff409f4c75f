//! Approval domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::contract::{ContractError, ContractId};
use crate::domain::directory::UserId;
use crate::domain::workflow::{ApprovalMode, ApprovalPlan, WorkflowId};

use super::value_objects::{ApprovalId, ApprovalStatus, Decision};

/// One approver's record within one stage of a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub id: ApprovalId,
    pub contract_id: ContractId,
    pub workflow_id: WorkflowId,
    /// Submission counter; every resubmission starts a new round
    pub round: u32,
    pub step_order: u32,
    pub step_name: String,
    pub mode: ApprovalMode,
    pub approver_id: UserId,
    pub status: ApprovalStatus,
    pub comment: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    /// When the record became actionable; unset while it is waiting
    pub opened_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Approval {
    /// Record a decision on a pending approval
    pub fn decide(
        &mut self,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<(), ContractError> {
        if self.status != ApprovalStatus::Pending {
            return Err(ContractError::ApprovalNotActionable {
                id: self.id.to_string(),
                status: self.status.to_string(),
            });
        }

        let comment = comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        if decision == Decision::Reject && comment.is_none() {
            return Err(ContractError::validation(
                "comment",
                "a rejection must state a reason",
            ));
        }

        self.status = decision.resulting_status();
        self.comment = comment;
        self.decided_at = Some(Utc::now());
        Ok(())
    }

    /// Start of the approver's turn
    pub fn pending_since(&self) -> DateTime<Utc> {
        self.opened_at.unwrap_or(self.created_at)
    }

    /// Hours between the record opening and its decision, if decided
    pub fn decision_hours(&self) -> Option<f64> {
        self.decided_at
            .map(|decided| (decided - self.pending_since()).num_seconds() as f64 / 3600.0)
    }
}

/// Expand a plan into approval records: the first stage is actionable,
/// later stages wait their turn.
pub fn materialize(plan: &ApprovalPlan, contract_id: ContractId, round: u32) -> Vec<Approval> {
    let now = Utc::now();

    plan.stages
        .iter()
        .enumerate()
        .flat_map(|(index, stage)| {
            let (status, opened_at) = if index == 0 {
                (ApprovalStatus::Pending, Some(now))
            } else {
                (ApprovalStatus::Waiting, None)
            };
            stage.approvers.iter().map(move |approver_id| Approval {
                id: ApprovalId::generate(),
                contract_id,
                workflow_id: plan.workflow_id,
                round,
                step_order: stage.step_order,
                step_name: stage.name.clone(),
                mode: stage.mode,
                approver_id: *approver_id,
                status,
                comment: None,
                decided_at: None,
                opened_at,
                created_at: now,
            })
        })
        .collect()
}

/// Records belonging to the most recent submission round
pub fn current_round(approvals: &[Approval]) -> Vec<Approval> {
    let Some(latest) = approvals.iter().map(|a| a.round).max() else {
        return Vec::new();
    };
    approvals
        .iter()
        .filter(|a| a.round == latest)
        .cloned()
        .collect()
}
