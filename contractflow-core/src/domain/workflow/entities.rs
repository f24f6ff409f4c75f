//! Workflow domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::WorkflowError;
use super::value_objects::{ApprovalMode, ApproverSpec, StepCondition, WorkflowId};

/// One stage of an approval template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step_order: u32,
    pub name: String,
    pub approvers: Vec<ApproverSpec>,
    #[serde(default)]
    pub mode: ApprovalMode,
    #[serde(default)]
    pub condition: Option<StepCondition>,
}

impl WorkflowStep {
    /// Whether this step applies to a contract of the given amount and type
    pub fn applies_to(&self, amount_cents: i64, contract_type: &str) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|c| c.matches(amount_cents, contract_type))
    }
}

/// Approval template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    pub description: Option<String>,
    /// Contract type this template is dedicated to
    pub contract_type: Option<String>,
    /// Fallback for contract types without a dedicated template
    pub is_default: bool,
    pub active: bool,
    pub steps: Vec<WorkflowStep>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Minimum name length
    pub const NAME_MIN_LENGTH: usize = 2;
    /// Maximum name length
    pub const NAME_MAX_LENGTH: usize = 100;

    /// Create a new active workflow
    pub fn new(
        name: String,
        description: Option<String>,
        contract_type: Option<String>,
        is_default: bool,
        steps: Vec<WorkflowStep>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: WorkflowId::generate(),
            name: name.trim().to_string(),
            description,
            contract_type: contract_type
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            is_default,
            active: true,
            steps,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the template is well formed
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let name_len = self.name.trim().chars().count();
        if !(Self::NAME_MIN_LENGTH..=Self::NAME_MAX_LENGTH).contains(&name_len) {
            return Err(WorkflowError::invalid(format!(
                "name must be between {} and {} characters",
                Self::NAME_MIN_LENGTH,
                Self::NAME_MAX_LENGTH
            )));
        }

        if self.steps.is_empty() {
            return Err(WorkflowError::invalid("workflow needs at least one step"));
        }

        let mut previous: Option<u32> = None;
        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(WorkflowError::invalid(format!(
                    "step {} has an empty name",
                    step.step_order
                )));
            }

            if step.approvers.is_empty() {
                return Err(WorkflowError::invalid(format!(
                    "step {} has no approvers",
                    step.step_order
                )));
            }

            if let Some(prev) = previous {
                if step.step_order <= prev {
                    return Err(WorkflowError::invalid(format!(
                        "step orders must be strictly increasing ({} after {})",
                        step.step_order, prev
                    )));
                }
            }
            previous = Some(step.step_order);

            for spec in &step.approvers {
                if let ApproverSpec::Role { role } = spec {
                    if role.trim().is_empty() {
                        return Err(WorkflowError::invalid(format!(
                            "step {} has an empty role",
                            step.step_order
                        )));
                    }
                }
            }

            if let Some(condition) = &step.condition {
                if let (Some(min), Some(max)) =
                    (condition.min_amount_cents, condition.max_amount_cents)
                {
                    if min >= max {
                        return Err(WorkflowError::invalid(format!(
                            "step {} amount range is empty ({} >= {})",
                            step.step_order, min, max
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Whether this template is dedicated to the contract type
    pub fn covers_type(&self, contract_type: &str) -> bool {
        self.contract_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(contract_type))
    }
}
