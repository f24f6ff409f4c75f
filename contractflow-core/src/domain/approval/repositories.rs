//! Approval repository traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::contract::{ContractError, ContractId};
use crate::domain::directory::UserId;

use super::entities::Approval;
use super::value_objects::{ApprovalId, ApprovalStatus};

/// Approval record persistence
#[async_trait]
pub trait IApprovalRepository: Send + Sync {
    /// Insert the records of a new submission round
    async fn create_many(&self, approvals: &[Approval]) -> Result<(), ContractError>;

    /// Find an approval by ID
    async fn find_by_id(&self, id: &ApprovalId) -> Result<Option<Approval>, ContractError>;

    /// Every record for a contract ordered by round, step order and creation time
    async fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Approval>, ContractError>;

    /// Records in `status` assigned to a user, longest waiting first
    async fn list_for_approver(
        &self,
        approver_id: &UserId,
        status: ApprovalStatus,
    ) -> Result<Vec<Approval>, ContractError>;

    /// Persist status, comment, decision and opening time of the given records
    async fn update_many(&self, approvals: &[Approval]) -> Result<(), ContractError>;

    /// Records created in `[from, to)`; open ends are unbounded
    async fn list_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Approval>, ContractError>;
}
