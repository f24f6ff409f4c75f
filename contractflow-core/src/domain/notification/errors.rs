//! Notification domain errors

use thiserror::Error;

/// Notification domain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// Notification not found
    #[error("Notification not found: {id}")]
    NotFound { id: String },

    /// Notification belongs to someone else
    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// Database operation failed
    #[error("Database error: {message}")]
    DatabaseError { message: String },
}

impl NotificationError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NotificationError::NotFound { .. })
    }
}
