//! Workflow domain errors

use thiserror::Error;

use crate::domain::directory::DirectoryError;

/// Workflow domain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// Workflow not found
    #[error("Workflow not found: {id}")]
    NotFound { id: String },

    /// Template failed validation
    #[error("Invalid workflow definition: {reason}")]
    InvalidDefinition { reason: String },

    /// Another workflow already uses this name
    #[error("Workflow name already exists: {name}")]
    NameAlreadyExists { name: String },

    /// Contracts awaiting approval still reference the workflow
    #[error("Workflow {id} is used by {contracts} contract(s) pending approval")]
    InUse { id: String, contracts: u64 },

    /// No active workflow covers the contract
    #[error("No applicable workflow for contract type '{contract_type}'")]
    NoApplicableWorkflow { contract_type: String },

    /// A matching step resolved to nobody
    #[error("Step {step} ('{name}') resolved to no eligible approvers")]
    UnresolvableStep { step: u32, name: String },

    /// User directory failure while resolving approvers
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Database operation failed
    #[error("Database error: {message}")]
    DatabaseError { message: String },
}

impl WorkflowError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            reason: reason.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Directory(e) => e.is_not_found(),
            _ => false,
        }
    }
}
