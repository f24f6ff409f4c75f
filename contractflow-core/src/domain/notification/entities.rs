//! Notification domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::contract::ContractId;
use crate::domain::directory::UserId;

define_id!(
    /// Notification ID
    NotificationId
);

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApprovalRequested,
    ContractApproved,
    ContractRejected,
    CommentAdded,
    ContractExpiring,
    ContractExpired,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 6] = [
        Self::ApprovalRequested,
        Self::ContractApproved,
        Self::ContractRejected,
        Self::CommentAdded,
        Self::ContractExpiring,
        Self::ContractExpired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApprovalRequested => "approval_requested",
            Self::ContractApproved => "contract_approved",
            Self::ContractRejected => "contract_rejected",
            Self::CommentAdded => "comment_added",
            Self::ContractExpiring => "contract_expiring",
            Self::ContractExpired => "contract_expired",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown notification kind: {}", s))
    }
}

/// In-app message for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub contract_id: Option<ContractId>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: UserId,
        kind: NotificationKind,
        contract_id: Option<ContractId>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            contract_id,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
