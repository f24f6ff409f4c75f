//! SQLx implementation of the comment repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::comment::{Comment, CommentId, ICommentRepository};
use crate::domain::contract::{ContractError, ContractId};
use crate::domain::directory::UserId;

/// Database row for the comments table
#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    contract_id: Uuid,
    author_id: Uuid,
    body: String,
    parent_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    edited_at: Option<DateTime<Utc>>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: CommentId::from(row.id),
            contract_id: ContractId::from(row.contract_id),
            author_id: UserId::from(row.author_id),
            body: row.body,
            parent_id: row.parent_id.map(CommentId::from),
            created_at: row.created_at,
            edited_at: row.edited_at,
        }
    }
}

fn database_error(context: &str, e: sqlx::Error) -> ContractError {
    tracing::error!("Database error {}: {}", context, e);
    ContractError::DatabaseError {
        message: e.to_string(),
    }
}

/// SQLx implementation of the comment repository
pub struct SqlxCommentRepository {
    pool: Arc<PgPool>,
}

impl SqlxCommentRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ICommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<(), ContractError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, contract_id, author_id, body, parent_id, created_at, edited_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(comment.id.as_uuid())
        .bind(comment.contract_id.as_uuid())
        .bind(comment.author_id.as_uuid())
        .bind(&comment.body)
        .bind(comment.parent_id.map(|p| p.as_uuid()))
        .bind(comment.created_at)
        .bind(comment.edited_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| database_error("creating comment", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, ContractError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, contract_id, author_id, body, parent_id, created_at, edited_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| database_error("finding comment", e))?;

        Ok(row.map(Comment::from))
    }

    async fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Comment>, ContractError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, contract_id, author_id, body, parent_id, created_at, edited_at
            FROM comments
            WHERE contract_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(contract_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| database_error("listing comments", e))?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn update(&self, comment: &Comment) -> Result<(), ContractError> {
        let result = sqlx::query("UPDATE comments SET body = $2, edited_at = $3 WHERE id = $1")
            .bind(comment.id.as_uuid())
            .bind(&comment.body)
            .bind(comment.edited_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| database_error("updating comment", e))?;

        if result.rows_affected() == 0 {
            return Err(ContractError::CommentNotFound {
                id: comment.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: &CommentId) -> Result<(), ContractError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| database_error("deleting comment", e))?;

        if result.rows_affected() == 0 {
            return Err(ContractError::CommentNotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn has_replies(&self, id: &CommentId) -> Result<bool, ContractError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM comments WHERE parent_id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| database_error("checking comment replies", e))
    }
}
