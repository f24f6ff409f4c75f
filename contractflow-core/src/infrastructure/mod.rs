//! Infrastructure Layer - persistence implementations
//!
//! PostgreSQL repositories for production and in-memory ones for tests and
//! the `memory` storage backend, both behind the domain repository traits.

pub mod memory;
pub mod postgres;

use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::approval::IApprovalRepository;
use crate::domain::comment::ICommentRepository;
use crate::domain::contract::IContractRepository;
use crate::domain::directory::{IReferenceRepository, IUserRepository};
use crate::domain::document::IDocumentRepository;
use crate::domain::notification::INotificationRepository;
use crate::domain::workflow::IWorkflowRepository;

/// Every repository the application layer needs, type-erased
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn IUserRepository>,
    pub references: Arc<dyn IReferenceRepository>,
    pub contracts: Arc<dyn IContractRepository>,
    pub workflows: Arc<dyn IWorkflowRepository>,
    pub approvals: Arc<dyn IApprovalRepository>,
    pub documents: Arc<dyn IDocumentRepository>,
    pub comments: Arc<dyn ICommentRepository>,
    pub notifications: Arc<dyn INotificationRepository>,
    pool: Option<Arc<PgPool>>,
}

impl Repositories {
    /// Repositories backed by a PostgreSQL pool
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            users: Arc::new(postgres::SqlxUserRepository::new(pool.clone())),
            references: Arc::new(postgres::SqlxReferenceRepository::new(pool.clone())),
            contracts: Arc::new(postgres::SqlxContractRepository::new(pool.clone())),
            workflows: Arc::new(postgres::SqlxWorkflowRepository::new(pool.clone())),
            approvals: Arc::new(postgres::SqlxApprovalRepository::new(pool.clone())),
            documents: Arc::new(postgres::SqlxDocumentRepository::new(pool.clone())),
            comments: Arc::new(postgres::SqlxCommentRepository::new(pool.clone())),
            notifications: Arc::new(postgres::SqlxNotificationRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Fresh, empty in-memory repositories
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(memory::InMemoryUserRepository::new()),
            references: Arc::new(memory::InMemoryReferenceRepository::new()),
            contracts: Arc::new(memory::InMemoryContractRepository::new()),
            workflows: Arc::new(memory::InMemoryWorkflowRepository::new()),
            approvals: Arc::new(memory::InMemoryApprovalRepository::new()),
            documents: Arc::new(memory::InMemoryDocumentRepository::new()),
            comments: Arc::new(memory::InMemoryCommentRepository::new()),
            notifications: Arc::new(memory::InMemoryNotificationRepository::new()),
            pool: None,
        }
    }

    /// Name of the backing store, as reported by the health endpoint
    pub fn backend_name(&self) -> &'static str {
        if self.pool.is_some() { "postgres" } else { "memory" }
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> bool {
        match &self.pool {
            Some(pool) => sqlx::query("SELECT 1")
                .execute(pool.as_ref())
                .await
                .map_err(|e| tracing::warn!(error = %e, "Database health check failed"))
                .is_ok(),
            None => true,
        }
    }
}
