//! Workflow value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::directory::UserId;

define_id!(
    /// Workflow ID value object
    WorkflowId
);

/// How the approvers of one step combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// Every approver must approve
    #[default]
    All,
    /// The first approval completes the step
    Any,
}

impl ApprovalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ApprovalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            other => Err(format!("Unknown approval mode: {}", other)),
        }
    }
}

/// Who may approve a step, before resolution against the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApproverSpec {
    /// A named user
    User { user_id: UserId },
    /// Every active user holding the role
    Role { role: String },
    /// Head of the contract's department
    DepartmentHead,
}

impl fmt::Display for ApproverSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { user_id } => write!(f, "user:{}", user_id),
            Self::Role { role } => write!(f, "role:{}", role),
            Self::DepartmentHead => f.write_str("department_head"),
        }
    }
}

/// Gate deciding whether a step applies to a contract
///
/// The amount range is half-open: `min <= amount < max`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCondition {
    #[serde(default)]
    pub min_amount_cents: Option<i64>,
    #[serde(default)]
    pub max_amount_cents: Option<i64>,
    /// Empty means every type
    #[serde(default)]
    pub contract_types: Vec<String>,
}

impl StepCondition {
    pub fn matches(&self, amount_cents: i64, contract_type: &str) -> bool {
        let above_min = self.min_amount_cents.is_none_or(|min| amount_cents >= min);
        let below_max = self.max_amount_cents.is_none_or(|max| amount_cents < max);
        let type_ok = self.contract_types.is_empty()
            || self
                .contract_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(contract_type));

        above_min && below_max && type_ok
    }
}
