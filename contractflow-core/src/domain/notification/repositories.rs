//! Notification repository traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::contract::ContractId;
use crate::domain::directory::UserId;

use super::entities::{Notification, NotificationId, NotificationKind};
use super::errors::NotificationError;

/// Notification persistence
#[async_trait]
pub trait INotificationRepository: Send + Sync {
    /// Insert a notification
    async fn create(&self, notification: &Notification) -> Result<(), NotificationError>;

    /// Find a notification by ID
    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationError>;

    /// A user's notifications, newest first
    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, NotificationError>;

    /// Number of unread notifications for a user
    async fn count_unread(&self, user_id: &UserId) -> Result<u64, NotificationError>;

    /// Set `read_at` on one notification if still unread
    async fn mark_read(
        &self,
        id: &NotificationId,
        read_at: DateTime<Utc>,
    ) -> Result<(), NotificationError>;

    /// Mark every unread notification of a user, returning how many changed
    async fn mark_all_read(
        &self,
        user_id: &UserId,
        read_at: DateTime<Utc>,
    ) -> Result<u64, NotificationError>;

    /// Whether a notification of this kind was already sent for the contract
    async fn exists(
        &self,
        user_id: &UserId,
        contract_id: &ContractId,
        kind: NotificationKind,
    ) -> Result<bool, NotificationError>;
}
