//! Approval routing engine
//!
//! Selection of a template for a contract and resolution of its steps into a
//! concrete plan. Selection is pure; planning only reads the user directory.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::contract::Contract;
use crate::domain::directory::{IUserRepository, UserId};

use super::entities::{Workflow, WorkflowStep};
use super::errors::WorkflowError;
use super::value_objects::{ApprovalMode, ApproverSpec, WorkflowId};

/// The facts about a contract that routing depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSubject {
    pub contract_type: String,
    pub amount_cents: i64,
    pub department: Option<String>,
    /// Excluded from every stage
    pub created_by: Option<UserId>,
}

impl From<&Contract> for PlanSubject {
    fn from(contract: &Contract) -> Self {
        Self {
            contract_type: contract.contract_type.clone(),
            amount_cents: contract.value.amount_cents,
            department: contract.department.clone(),
            created_by: Some(contract.created_by),
        }
    }
}

/// A workflow step resolved to concrete approvers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStage {
    pub step_order: u32,
    pub name: String,
    pub mode: ApprovalMode,
    pub approvers: Vec<UserId>,
}

/// Ordered stages a contract must pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPlan {
    pub workflow_id: WorkflowId,
    pub workflow_name: String,
    pub stages: Vec<PlannedStage>,
}

impl ApprovalPlan {
    /// A plan with no stages approves immediately
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Pick the template for a contract type.
///
/// A dedicated active template wins over the active default; among several
/// candidates the most recently updated one is used.
pub fn select_workflow<'a>(
    workflows: &'a [Workflow],
    contract_type: &str,
) -> Result<&'a Workflow, WorkflowError> {
    let latest = |candidates: Vec<&'a Workflow>| {
        candidates
            .into_iter()
            .max_by(|a, b| a.updated_at.cmp(&b.updated_at).then(a.id.cmp(&b.id)))
    };

    let dedicated = workflows
        .iter()
        .filter(|w| w.active && w.covers_type(contract_type))
        .collect::<Vec<_>>();
    if let Some(workflow) = latest(dedicated) {
        return Ok(workflow);
    }

    let defaults = workflows
        .iter()
        .filter(|w| w.active && w.is_default)
        .collect::<Vec<_>>();
    latest(defaults).ok_or_else(|| WorkflowError::NoApplicableWorkflow {
        contract_type: contract_type.to_string(),
    })
}

/// Resolve a template into concrete stages for one contract
pub async fn plan(
    workflow: &Workflow,
    subject: &PlanSubject,
    users: &dyn IUserRepository,
) -> Result<ApprovalPlan, WorkflowError> {
    let mut stages = Vec::with_capacity(workflow.steps.len());

    for step in &workflow.steps {
        if !step.applies_to(subject.amount_cents, &subject.contract_type) {
            debug!(
                workflow = %workflow.id,
                step = step.step_order,
                "Step condition not met, skipping"
            );
            continue;
        }

        let approvers = resolve_step(step, subject, users).await?;
        if approvers.is_empty() {
            return Err(WorkflowError::UnresolvableStep {
                step: step.step_order,
                name: step.name.clone(),
            });
        }

        stages.push(PlannedStage {
            step_order: step.step_order,
            name: step.name.clone(),
            mode: step.mode,
            approvers,
        });
    }

    Ok(ApprovalPlan {
        workflow_id: workflow.id,
        workflow_name: workflow.name.clone(),
        stages,
    })
}

async fn resolve_step(
    step: &WorkflowStep,
    subject: &PlanSubject,
    users: &dyn IUserRepository,
) -> Result<Vec<UserId>, WorkflowError> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for spec in &step.approvers {
        let candidates = match spec {
            ApproverSpec::User { user_id } => users
                .find_by_id(user_id)
                .await?
                .filter(|u| u.active)
                .into_iter()
                .collect::<Vec<_>>(),
            ApproverSpec::Role { role } => users.find_by_role(role).await?,
            ApproverSpec::DepartmentHead => match subject.department.as_deref() {
                Some(department) => users
                    .find_by_department(department)
                    .await?
                    .into_iter()
                    .filter(|u| u.is_head_of(department))
                    .collect(),
                None => Vec::new(),
            },
        };

        for user in candidates {
            if !user.active || subject.created_by == Some(user.id) {
                continue;
            }
            if seen.insert(user.id) {
                resolved.push(user.id);
            }
        }
    }

    Ok(resolved)
}
