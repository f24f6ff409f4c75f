//! Approval value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

define_id!(
    /// Approval ID value object
    ApprovalId
);

/// State of one approver's record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Belongs to a later stage
    Waiting,
    /// Awaiting this approver's decision
    Pending,
    Approved,
    Rejected,
    /// Another approver completed an `any` step first
    Skipped,
    /// Withdrawn, or rejected elsewhere
    Cancelled,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 6] = [
        Self::Waiting,
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Skipped,
        Self::Cancelled,
    ];

    /// Still open (not decided and not closed by the engine)
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Waiting | Self::Pending)
    }

    /// An approver actually decided
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Skipped => "skipped",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown approval status: {}", s))
    }
}

/// An approver's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn resulting_status(&self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}
