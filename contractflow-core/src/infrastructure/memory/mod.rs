//! In-memory repositories
//!
//! `tokio::sync::RwLock` maps implementing the same traits as the PostgreSQL
//! repositories. Used for the `memory` storage backend and in tests; nothing
//! survives a restart.

mod approval_repository;
mod comment_repository;
mod contract_repository;
mod directory_repository;
mod document_repository;
mod notification_repository;
mod workflow_repository;

pub use approval_repository::InMemoryApprovalRepository;
pub use comment_repository::InMemoryCommentRepository;
pub use contract_repository::InMemoryContractRepository;
pub use directory_repository::{InMemoryReferenceRepository, InMemoryUserRepository};
pub use document_repository::InMemoryDocumentRepository;
pub use notification_repository::InMemoryNotificationRepository;
pub use workflow_repository::InMemoryWorkflowRepository;

use chrono::{DateTime, Utc};

/// Whether `at` lies in the half-open window `[from, to)`
pub(crate) fn in_window(
    at: DateTime<Utc>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> bool {
    from.is_none_or(|f| at >= f) && to.is_none_or(|t| at < t)
}
