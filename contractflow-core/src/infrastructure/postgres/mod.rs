//! PostgreSQL repositories (sqlx)
//!
//! Runtime-checked queries against the schema in `migrations/`. Every
//! `sqlx::Error` is logged and mapped to the owning domain error.

mod approval_repository;
mod comment_repository;
mod contract_repository;
mod directory_repository;
mod document_repository;
mod notification_repository;
mod workflow_repository;

pub use approval_repository::SqlxApprovalRepository;
pub use comment_repository::SqlxCommentRepository;
pub use contract_repository::SqlxContractRepository;
pub use directory_repository::{SqlxReferenceRepository, SqlxUserRepository};
pub use document_repository::SqlxDocumentRepository;
pub use notification_repository::SqlxNotificationRepository;
pub use workflow_repository::SqlxWorkflowRepository;

/// Whether the error is a unique violation on the named index
pub(crate) fn violates(error: &sqlx::Error, constraint: &str) -> bool {
    error
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation() && db.constraint() == Some(constraint))
}

/// Convert an unsigned domain counter to a database integer
pub(crate) fn to_i32(value: u32, field: &str) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("{} out of range: {}", field, value))
}

/// Convert a database integer back to an unsigned domain counter
pub(crate) fn to_u32(value: i32, field: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("Stored {} is negative: {}", field, value))
}
