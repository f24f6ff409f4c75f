//! In-memory workflow repository

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::workflow::{IWorkflowRepository, Workflow, WorkflowError, WorkflowId};

/// In-memory workflow repository
#[derive(Default)]
pub struct InMemoryWorkflowRepository {
    workflows: RwLock<HashMap<WorkflowId, Workflow>>,
}

impl InMemoryWorkflowRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(workflows: &HashMap<WorkflowId, Workflow>, candidate: &Workflow) -> bool {
    workflows
        .values()
        .any(|w| w.id != candidate.id && w.name.eq_ignore_ascii_case(&candidate.name))
}

#[async_trait]
impl IWorkflowRepository for InMemoryWorkflowRepository {
    async fn find_by_id(&self, id: &WorkflowId) -> Result<Option<Workflow>, WorkflowError> {
        Ok(self.workflows.read().await.get(id).cloned())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Workflow>, WorkflowError> {
        let workflows = self.workflows.read().await;
        let mut listed = workflows
            .values()
            .filter(|w| !active_only || w.active)
            .cloned()
            .collect::<Vec<_>>();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn create(&self, workflow: &Workflow) -> Result<(), WorkflowError> {
        let mut workflows = self.workflows.write().await;
        if name_taken(&workflows, workflow) {
            return Err(WorkflowError::NameAlreadyExists {
                name: workflow.name.clone(),
            });
        }
        workflows.insert(workflow.id, workflow.clone());
        Ok(())
    }

    async fn update(&self, workflow: &Workflow) -> Result<(), WorkflowError> {
        let mut workflows = self.workflows.write().await;
        if !workflows.contains_key(&workflow.id) {
            return Err(WorkflowError::NotFound {
                id: workflow.id.to_string(),
            });
        }
        if name_taken(&workflows, workflow) {
            return Err(WorkflowError::NameAlreadyExists {
                name: workflow.name.clone(),
            });
        }
        workflows.insert(workflow.id, workflow.clone());
        Ok(())
    }

    async fn delete(&self, id: &WorkflowId) -> Result<(), WorkflowError> {
        match self.workflows.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(WorkflowError::NotFound { id: id.to_string() }),
        }
    }
}
