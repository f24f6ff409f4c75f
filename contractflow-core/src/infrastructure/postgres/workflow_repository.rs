//! SQLx implementation of the workflow repository
//!
//! Steps are stored as a JSONB document alongside the template row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::workflow::{
    IWorkflowRepository, Workflow, WorkflowError, WorkflowId, WorkflowStep,
};

use super::violates;

/// Database row for the workflows table
#[derive(Debug, sqlx::FromRow)]
struct WorkflowRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    contract_type: Option<String>,
    is_default: bool,
    active: bool,
    steps: Json<Vec<WorkflowStep>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WorkflowRow> for Workflow {
    fn from(row: WorkflowRow) -> Self {
        Workflow {
            id: WorkflowId::from(row.id),
            name: row.name,
            description: row.description,
            contract_type: row.contract_type,
            is_default: row.is_default,
            active: row.active,
            steps: row.steps.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn database_error(context: &str, e: sqlx::Error) -> WorkflowError {
    tracing::error!("Database error {}: {}", context, e);
    WorkflowError::DatabaseError {
        message: e.to_string(),
    }
}

/// SQLx implementation of the workflow repository
pub struct SqlxWorkflowRepository {
    pool: Arc<PgPool>,
}

impl SqlxWorkflowRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IWorkflowRepository for SqlxWorkflowRepository {
    async fn find_by_id(&self, id: &WorkflowId) -> Result<Option<Workflow>, WorkflowError> {
        let row = sqlx::query_as::<_, WorkflowRow>(
            r#"
            SELECT id, name, description, contract_type, is_default, active, steps,
                created_at, updated_at
            FROM workflows
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| database_error("finding workflow", e))?;

        Ok(row.map(Workflow::from))
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Workflow>, WorkflowError> {
        let rows = sqlx::query_as::<_, WorkflowRow>(
            r#"
            SELECT id, name, description, contract_type, is_default, active, steps,
                created_at, updated_at
            FROM workflows
            WHERE active OR NOT $1
            ORDER BY name
            "#,
        )
        .bind(active_only)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| database_error("listing workflows", e))?;

        Ok(rows.into_iter().map(Workflow::from).collect())
    }

    async fn create(&self, workflow: &Workflow) -> Result<(), WorkflowError> {
        sqlx::query(
            r#"
            INSERT INTO workflows (id, name, description, contract_type, is_default, active,
                steps, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(workflow.id.as_uuid())
        .bind(&workflow.name)
        .bind(&workflow.description)
        .bind(&workflow.contract_type)
        .bind(workflow.is_default)
        .bind(workflow.active)
        .bind(Json(&workflow.steps))
        .bind(workflow.created_at)
        .bind(workflow.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "idx_workflows_name") {
                return WorkflowError::NameAlreadyExists {
                    name: workflow.name.clone(),
                };
            }
            database_error("creating workflow", e)
        })?;

        Ok(())
    }

    async fn update(&self, workflow: &Workflow) -> Result<(), WorkflowError> {
        let result = sqlx::query(
            r#"
            UPDATE workflows
            SET name = $2, description = $3, contract_type = $4, is_default = $5,
                active = $6, steps = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(workflow.id.as_uuid())
        .bind(&workflow.name)
        .bind(&workflow.description)
        .bind(&workflow.contract_type)
        .bind(workflow.is_default)
        .bind(workflow.active)
        .bind(Json(&workflow.steps))
        .bind(workflow.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "idx_workflows_name") {
                return WorkflowError::NameAlreadyExists {
                    name: workflow.name.clone(),
                };
            }
            database_error("updating workflow", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(WorkflowError::NotFound {
                id: workflow.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: &WorkflowId) -> Result<(), WorkflowError> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| database_error("deleting workflow", e))?;

        if result.rows_affected() == 0 {
            return Err(WorkflowError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}
