//! In-memory notification repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::contract::ContractId;
use crate::domain::directory::UserId;
use crate::domain::notification::{
    INotificationRepository, Notification, NotificationError, NotificationId, NotificationKind,
};

/// In-memory notification repository
#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<HashMap<NotificationId, Notification>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl INotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationError> {
        Ok(self.notifications.read().await.get(id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, NotificationError> {
        let notifications = self.notifications.read().await;
        let mut listed = notifications
            .values()
            .filter(|n| n.user_id == *user_id && (!unread_only || !n.is_read()))
            .cloned()
            .collect::<Vec<_>>();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        listed.truncate(limit as usize);
        Ok(listed)
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, NotificationError> {
        Ok(self
            .notifications
            .read()
            .await
            .values()
            .filter(|n| n.user_id == *user_id && !n.is_read())
            .count() as u64)
    }

    async fn mark_read(
        &self,
        id: &NotificationId,
        read_at: DateTime<Utc>,
    ) -> Result<(), NotificationError> {
        let mut notifications = self.notifications.write().await;
        match notifications.get_mut(id) {
            Some(notification) => {
                if notification.read_at.is_none() {
                    notification.read_at = Some(read_at);
                }
                Ok(())
            }
            None => Err(NotificationError::NotFound { id: id.to_string() }),
        }
    }

    async fn mark_all_read(
        &self,
        user_id: &UserId,
        read_at: DateTime<Utc>,
    ) -> Result<u64, NotificationError> {
        let mut notifications = self.notifications.write().await;
        let mut changed = 0;
        for notification in notifications
            .values_mut()
            .filter(|n| n.user_id == *user_id && n.read_at.is_none())
        {
            notification.read_at = Some(read_at);
            changed += 1;
        }
        Ok(changed)
    }

    async fn exists(
        &self,
        user_id: &UserId,
        contract_id: &ContractId,
        kind: NotificationKind,
    ) -> Result<bool, NotificationError> {
        Ok(self.notifications.read().await.values().any(|n| {
            n.user_id == *user_id && n.contract_id == Some(*contract_id) && n.kind == kind
        }))
    }
}
