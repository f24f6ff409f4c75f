//! Directory domain errors

use thiserror::Error;

/// Directory domain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    /// User not found
    #[error("User not found: {id}")]
    UserNotFound { id: String },

    /// User exists but is deactivated
    #[error("User {id} is inactive")]
    UserInactive { id: String },

    /// Email already registered
    #[error("Email already exists: {email}")]
    EmailAlreadyExists { email: String },

    /// Reference code already used for this type
    #[error("Reference {ref_type}/{code} already exists")]
    ReferenceAlreadyExists { ref_type: String, code: String },

    /// Database operation failed
    #[error("Database error: {message}")]
    DatabaseError { message: String },
}

impl DirectoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::UserNotFound { .. })
    }
}
