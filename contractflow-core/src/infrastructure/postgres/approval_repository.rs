//! SQLx implementation of the approval repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::approval::{Approval, ApprovalId, ApprovalStatus, IApprovalRepository};
use crate::domain::contract::{ContractError, ContractId};
use crate::domain::directory::UserId;
use crate::domain::workflow::{ApprovalMode, WorkflowId};

use super::{to_i32, to_u32};

const APPROVAL_COLUMNS: &str = "id, contract_id, workflow_id, round, step_order, step_name, \
     mode, approver_id, status, comment, decided_at, opened_at, created_at";

/// Database row for the approvals table
#[derive(Debug, sqlx::FromRow)]
struct ApprovalRow {
    id: Uuid,
    contract_id: Uuid,
    workflow_id: Uuid,
    round: i32,
    step_order: i32,
    step_name: String,
    mode: String,
    approver_id: Uuid,
    status: String,
    comment: Option<String>,
    decided_at: Option<DateTime<Utc>>,
    opened_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

fn corrupt(message: String) -> ContractError {
    tracing::error!("Corrupt approval row: {}", message);
    ContractError::DatabaseError { message }
}

fn database_error(context: &str, e: sqlx::Error) -> ContractError {
    tracing::error!("Database error {}: {}", context, e);
    ContractError::DatabaseError {
        message: e.to_string(),
    }
}

fn row_to_approval(row: ApprovalRow) -> Result<Approval, ContractError> {
    Ok(Approval {
        id: ApprovalId::from(row.id),
        contract_id: ContractId::from(row.contract_id),
        workflow_id: WorkflowId::from(row.workflow_id),
        round: to_u32(row.round, "round").map_err(corrupt)?,
        step_order: to_u32(row.step_order, "step_order").map_err(corrupt)?,
        step_name: row.step_name,
        mode: row.mode.parse::<ApprovalMode>().map_err(corrupt)?,
        approver_id: UserId::from(row.approver_id),
        status: row.status.parse::<ApprovalStatus>().map_err(corrupt)?,
        comment: row.comment,
        decided_at: row.decided_at,
        opened_at: row.opened_at,
        created_at: row.created_at,
    })
}

fn rows_to_approvals(rows: Vec<ApprovalRow>) -> Result<Vec<Approval>, ContractError> {
    rows.into_iter().map(row_to_approval).collect()
}

/// SQLx implementation of the approval repository
pub struct SqlxApprovalRepository {
    pool: Arc<PgPool>,
}

impl SqlxApprovalRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IApprovalRepository for SqlxApprovalRepository {
    async fn create_many(&self, approvals: &[Approval]) -> Result<(), ContractError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("starting transaction", e))?;

        for approval in approvals {
            sqlx::query(
                r#"
                INSERT INTO approvals (id, contract_id, workflow_id, round, step_order, step_name,
                    mode, approver_id, status, comment, decided_at, opened_at, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(approval.id.as_uuid())
            .bind(approval.contract_id.as_uuid())
            .bind(approval.workflow_id.as_uuid())
            .bind(to_i32(approval.round, "round").map_err(corrupt)?)
            .bind(to_i32(approval.step_order, "step_order").map_err(corrupt)?)
            .bind(&approval.step_name)
            .bind(approval.mode.as_str())
            .bind(approval.approver_id.as_uuid())
            .bind(approval.status.as_str())
            .bind(&approval.comment)
            .bind(approval.decided_at)
            .bind(approval.opened_at)
            .bind(approval.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("creating approval", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| database_error("committing approvals", e))
    }

    async fn find_by_id(&self, id: &ApprovalId) -> Result<Option<Approval>, ContractError> {
        let sql = format!("SELECT {} FROM approvals WHERE id = $1", APPROVAL_COLUMNS);
        let row = sqlx::query_as::<_, ApprovalRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| database_error("finding approval", e))?;
        row.map(row_to_approval).transpose()
    }

    async fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Approval>, ContractError> {
        let sql = format!(
            "SELECT {} FROM approvals WHERE contract_id = $1 \
             ORDER BY round, step_order, created_at, id",
            APPROVAL_COLUMNS
        );
        let rows = sqlx::query_as::<_, ApprovalRow>(&sql)
            .bind(contract_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| database_error("listing approvals for contract", e))?;
        rows_to_approvals(rows)
    }

    async fn list_for_approver(
        &self,
        approver_id: &UserId,
        status: ApprovalStatus,
    ) -> Result<Vec<Approval>, ContractError> {
        let sql = format!(
            "SELECT {} FROM approvals WHERE approver_id = $1 AND status = $2 \
             ORDER BY COALESCE(opened_at, created_at), id",
            APPROVAL_COLUMNS
        );
        let rows = sqlx::query_as::<_, ApprovalRow>(&sql)
            .bind(approver_id.as_uuid())
            .bind(status.as_str())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| database_error("listing approvals for approver", e))?;
        rows_to_approvals(rows)
    }

    async fn update_many(&self, approvals: &[Approval]) -> Result<(), ContractError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("starting transaction", e))?;

        for approval in approvals {
            let result = sqlx::query(
                r#"
                UPDATE approvals
                SET status = $2, comment = $3, decided_at = $4, opened_at = $5
                WHERE id = $1
                "#,
            )
            .bind(approval.id.as_uuid())
            .bind(approval.status.as_str())
            .bind(&approval.comment)
            .bind(approval.decided_at)
            .bind(approval.opened_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("updating approval", e))?;

            if result.rows_affected() == 0 {
                return Err(ContractError::ApprovalNotFound {
                    id: approval.id.to_string(),
                });
            }
        }

        tx.commit()
            .await
            .map_err(|e| database_error("committing approval updates", e))
    }

    async fn list_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Approval>, ContractError> {
        let sql = format!(
            "SELECT {} FROM approvals \
             WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
               AND ($2::timestamptz IS NULL OR created_at < $2) \
             ORDER BY round, step_order, created_at, id",
            APPROVAL_COLUMNS
        );
        let rows = sqlx::query_as::<_, ApprovalRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| database_error("listing approvals in window", e))?;
        rows_to_approvals(rows)
    }
}
