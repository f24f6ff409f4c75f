//! Notification service
//!
//! In-app notifications for approvers, contract owners and commenters.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{info, instrument, warn};

use crate::domain::contract::{Contract, ContractError, IContractRepository};
use crate::domain::directory::UserId;
use crate::domain::notification::{
    INotificationRepository, Notification, NotificationError, NotificationId, NotificationKind,
};

/// Upper bound for a single notification listing
pub const MAX_NOTIFICATION_LIMIT: u32 = 200;

/// Creates, lists and acknowledges notifications
#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn INotificationRepository>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn INotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Send a notification to one user
    #[instrument(skip(self, contract, title, message), fields(user_id = %user_id, kind = %kind))]
    pub async fn notify(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        contract: Option<&Contract>,
        title: impl Into<String> + Send,
        message: impl Into<String> + Send,
    ) -> Result<Notification, NotificationError> {
        let notification = Notification::new(
            user_id,
            kind,
            contract.map(|c| c.id),
            title,
            message,
        );
        self.notifications.create(&notification).await?;
        Ok(notification)
    }

    /// Like [`Self::notify`] but only logs failures.
    ///
    /// Used from workflows where the primary change has already been stored.
    pub async fn notify_or_warn(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        contract: &Contract,
        title: impl Into<String> + Send,
        message: impl Into<String> + Send,
    ) {
        if let Err(e) = self
            .notify(user_id, kind, Some(contract), title, message)
            .await
        {
            warn!(
                user_id = %user_id,
                contract_id = %contract.id,
                kind = %kind,
                "Failed to send notification (non-fatal): {}",
                e
            );
        }
    }

    /// A user's notifications, newest first
    pub async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, NotificationError> {
        let limit = limit.clamp(1, MAX_NOTIFICATION_LIMIT);
        self.notifications
            .list_for_user(user_id, unread_only, limit)
            .await
    }

    pub async fn unread_count(&self, user_id: &UserId) -> Result<u64, NotificationError> {
        self.notifications.count_unread(user_id).await
    }

    /// Mark one notification read; marking it again is a no-op
    #[instrument(skip(self), fields(notification_id = %id, user_id = %user_id))]
    pub async fn mark_read(
        &self,
        id: &NotificationId,
        user_id: &UserId,
    ) -> Result<Notification, NotificationError> {
        let mut notification = self
            .notifications
            .find_by_id(id)
            .await?
            .ok_or_else(|| NotificationError::NotFound { id: id.to_string() })?;

        if notification.user_id != *user_id {
            return Err(NotificationError::PermissionDenied {
                reason: "notification belongs to another user".to_string(),
            });
        }

        if notification.read_at.is_none() {
            let now = Utc::now();
            self.notifications.mark_read(id, now).await?;
            notification.read_at = Some(now);
        }
        Ok(notification)
    }

    /// Mark everything read, returning how many notifications changed
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationError> {
        self.notifications.mark_all_read(user_id, Utc::now()).await
    }

    /// Warn owners of active contracts ending within `within_days` of `today`.
    ///
    /// Each owner hears about a given contract once. Returns the number of
    /// notifications sent.
    #[instrument(skip(self, contracts))]
    pub async fn notify_expiring(
        &self,
        contracts: &dyn IContractRepository,
        today: NaiveDate,
        within_days: u32,
    ) -> Result<u64, ContractError> {
        let horizon = today
            .checked_add_signed(Duration::days(i64::from(within_days)))
            .ok_or_else(|| ContractError::validation("within_days", "window ends past the calendar"))?;
        let expiring = contracts.find_active_ending_between(today, horizon).await?;

        let mut sent = 0;
        for contract in &expiring {
            let already_sent = self
                .notifications
                .exists(
                    &contract.created_by,
                    &contract.id,
                    NotificationKind::ContractExpiring,
                )
                .await?;
            if already_sent {
                continue;
            }

            let days_left = contract.days_until_end(today);
            self.notify(
                contract.created_by,
                NotificationKind::ContractExpiring,
                Some(contract),
                format!("Contract {} is expiring", contract.contract_number),
                format!(
                    "'{}' with {} ends on {} ({} day(s) left).",
                    contract.title, contract.counterparty, contract.end_date, days_left
                ),
            )
            .await?;
            sent += 1;
        }

        if sent > 0 {
            info!(sent, within_days, "Sent contract expiry reminders");
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::{ContractNumber, ContractStatus, ContractTerms, Money};
    use crate::infrastructure::memory::{
        InMemoryContractRepository, InMemoryNotificationRepository,
    };

    fn service() -> NotificationService {
        NotificationService::new(Arc::new(InMemoryNotificationRepository::new()))
    }

    fn active_contract(owner: UserId, end_date: NaiveDate) -> Contract {
        let terms = ContractTerms {
            title: "Lease".to_string(),
            description: None,
            counterparty: "Initech".to_string(),
            contract_type: "lease".to_string(),
            department: None,
            value: Money::new(100, "USD").unwrap(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date,
        };
        let mut contract = Contract::new(ContractNumber::generate(end_date), terms, owner);
        contract.status = ContractStatus::Active;
        contract
    }

    #[tokio::test]
    async fn test_unread_tracking_and_idempotent_mark_read() {
        let service = service();
        let user = UserId::generate();
        let first = service
            .notify(user, NotificationKind::CommentAdded, None, "a", "b")
            .await
            .unwrap();
        service
            .notify(user, NotificationKind::CommentAdded, None, "c", "d")
            .await
            .unwrap();

        assert_eq!(service.unread_count(&user).await.unwrap(), 2);

        let read = service.mark_read(&first.id, &user).await.unwrap();
        let again = service.mark_read(&first.id, &user).await.unwrap();
        assert_eq!(read.read_at, again.read_at);
        assert_eq!(service.unread_count(&user).await.unwrap(), 1);

        let unread = service.list(&user, true, 50).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "c");

        assert_eq!(service.mark_all_read(&user).await.unwrap(), 1);
        assert_eq!(service.mark_all_read(&user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_checks_owner() {
        let service = service();
        let owner = UserId::generate();
        let n = service
            .notify(owner, NotificationKind::ContractApproved, None, "t", "m")
            .await
            .unwrap();

        let err = service
            .mark_read(&n.id, &UserId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn test_expiry_reminders_sent_once() {
        let service = service();
        let contracts = InMemoryContractRepository::new();
        let owner = UserId::generate();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let soon = active_contract(owner, NaiveDate::from_ymd_opt(2025, 6, 20).unwrap());
        let later = active_contract(owner, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        contracts.create(&soon).await.unwrap();
        contracts.create(&later).await.unwrap();

        assert_eq!(
            service.notify_expiring(&contracts, today, 30).await.unwrap(),
            1
        );
        assert_eq!(
            service.notify_expiring(&contracts, today, 30).await.unwrap(),
            0
        );

        let inbox = service.list(&owner, false, 10).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationKind::ContractExpiring);
        assert_eq!(inbox[0].contract_id, Some(soon.id));
    }

    #[tokio::test]
    async fn test_expiry_window_past_calendar_end_is_rejected() {
        let service = service();
        let contracts = InMemoryContractRepository::new();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let err = service
            .notify_expiring(&contracts, today, u32::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Validation { ref field, .. } if field == "within_days"));
    }
}
