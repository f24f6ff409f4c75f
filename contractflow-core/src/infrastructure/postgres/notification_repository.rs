//! SQLx implementation of the notification repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::contract::ContractId;
use crate::domain::directory::UserId;
use crate::domain::notification::{
    INotificationRepository, Notification, NotificationError, NotificationId, NotificationKind,
};

/// Database row for the notifications table
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    title: String,
    message: String,
    contract_id: Option<Uuid>,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

fn row_to_notification(row: NotificationRow) -> Result<Notification, NotificationError> {
    let kind = row.kind.parse::<NotificationKind>().map_err(|message| {
        tracing::error!("Corrupt notification row: {}", message);
        NotificationError::DatabaseError { message }
    })?;

    Ok(Notification {
        id: NotificationId::from(row.id),
        user_id: UserId::from(row.user_id),
        kind,
        title: row.title,
        message: row.message,
        contract_id: row.contract_id.map(ContractId::from),
        read_at: row.read_at,
        created_at: row.created_at,
    })
}

fn database_error(context: &str, e: sqlx::Error) -> NotificationError {
    tracing::error!("Database error {}: {}", context, e);
    NotificationError::DatabaseError {
        message: e.to_string(),
    }
}

/// SQLx implementation of the notification repository
pub struct SqlxNotificationRepository {
    pool: Arc<PgPool>,
}

impl SqlxNotificationRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl INotificationRepository for SqlxNotificationRepository {
    async fn create(&self, notification: &Notification) -> Result<(), NotificationError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, contract_id,
                read_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id.as_uuid())
        .bind(notification.user_id.as_uuid())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.contract_id.map(|c| c.as_uuid()))
        .bind(notification.read_at)
        .bind(notification.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| database_error("creating notification", e))?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, kind, title, message, contract_id, read_at, created_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| database_error("finding notification", e))?;

        row.map(row_to_notification).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, NotificationError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, kind, title, message, contract_id, read_at, created_at
            FROM notifications
            WHERE user_id = $1 AND (read_at IS NULL OR NOT $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(unread_only)
        .bind(i64::from(limit))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| database_error("listing notifications", e))?;

        rows.into_iter().map(row_to_notification).collect()
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, NotificationError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| database_error("counting unread notifications", e))?;

        Ok(count.max(0) as u64)
    }

    async fn mark_read(
        &self,
        id: &NotificationId,
        read_at: DateTime<Utc>,
    ) -> Result<(), NotificationError> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = COALESCE(read_at, $2) WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(read_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| database_error("marking notification read", e))?;

        if result.rows_affected() == 0 {
            return Err(NotificationError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn mark_all_read(
        &self,
        user_id: &UserId,
        read_at: DateTime<Utc>,
    ) -> Result<u64, NotificationError> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = $2 WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id.as_uuid())
        .bind(read_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| database_error("marking notifications read", e))?;

        Ok(result.rows_affected())
    }

    async fn exists(
        &self,
        user_id: &UserId,
        contract_id: &ContractId,
        kind: NotificationKind,
    ) -> Result<bool, NotificationError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE user_id = $1 AND contract_id = $2 AND kind = $3
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(contract_id.as_uuid())
        .bind(kind.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| database_error("checking existing notification", e))
    }
}
