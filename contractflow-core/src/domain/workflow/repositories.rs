//! Workflow repository traits

use async_trait::async_trait;

use super::entities::Workflow;
use super::errors::WorkflowError;
use super::value_objects::WorkflowId;

/// Workflow template persistence
#[async_trait]
pub trait IWorkflowRepository: Send + Sync {
    /// Find a workflow by ID
    async fn find_by_id(&self, id: &WorkflowId) -> Result<Option<Workflow>, WorkflowError>;

    /// List workflows sorted by name
    async fn list(&self, active_only: bool) -> Result<Vec<Workflow>, WorkflowError>;

    /// Create a new workflow
    async fn create(&self, workflow: &Workflow) -> Result<(), WorkflowError>;

    /// Update an existing workflow
    async fn update(&self, workflow: &Workflow) -> Result<(), WorkflowError>;

    /// Delete a workflow by ID
    async fn delete(&self, id: &WorkflowId) -> Result<(), WorkflowError>;
}
