//! Contract domain errors
//!
//! Shared by approvals, documents and comments, which all hang off a contract.

use thiserror::Error;

use super::value_objects::ContractStatus;
use crate::domain::directory::DirectoryError;
use crate::domain::notification::NotificationError;
use crate::domain::workflow::WorkflowError;

/// Contract domain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    /// Contract not found
    #[error("Contract not found: {id}")]
    NotFound { id: String },

    /// Contract number already used
    #[error("Contract number already exists: {number}")]
    DuplicateNumber { number: String },

    /// Input failed validation
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Status change not allowed by the lifecycle
    #[error("Invalid contract transition from {from} to {to}")]
    InvalidTransition {
        from: ContractStatus,
        to: ContractStatus,
    },

    /// Contract body is frozen in its current status
    #[error("Contract cannot be modified while {status}")]
    NotEditable { status: ContractStatus },

    /// Caller may not perform this action
    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// Approval record not found
    #[error("Approval not found: {id}")]
    ApprovalNotFound { id: String },

    /// Approval is not awaiting a decision
    #[error("Approval {id} is {status} and cannot be decided")]
    ApprovalNotActionable { id: String, status: String },

    /// Document version not found
    #[error("Document version {version} not found for contract {contract_id}")]
    DocumentNotFound { contract_id: String, version: u32 },

    /// Comment not found
    #[error("Comment not found: {id}")]
    CommentNotFound { id: String },

    /// Comment still has replies
    #[error("Comment {id} has replies and cannot be deleted")]
    CommentHasReplies { id: String },

    /// Workflow template or routing failure
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// User directory failure
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Notification delivery failure
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// Database operation failed
    #[error("Database error: {message}")]
    DatabaseError { message: String },
}

impl ContractError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. }
            | Self::ApprovalNotFound { .. }
            | Self::DocumentNotFound { .. }
            | Self::CommentNotFound { .. } => true,
            Self::Workflow(e) => e.is_not_found(),
            Self::Directory(e) => e.is_not_found(),
            Self::Notification(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a permission error
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}
