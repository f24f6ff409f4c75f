//! In-memory approval repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::approval::{Approval, ApprovalId, ApprovalStatus, IApprovalRepository};
use crate::domain::contract::{ContractError, ContractId};
use crate::domain::directory::UserId;

use super::in_window;

/// In-memory approval repository
#[derive(Default)]
pub struct InMemoryApprovalRepository {
    approvals: RwLock<HashMap<ApprovalId, Approval>>,
}

impl InMemoryApprovalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_records(approvals: &mut [Approval]) {
    approvals.sort_by(|a, b| {
        (a.round, a.step_order, a.created_at, a.id).cmp(&(b.round, b.step_order, b.created_at, b.id))
    });
}

#[async_trait]
impl IApprovalRepository for InMemoryApprovalRepository {
    async fn create_many(&self, approvals: &[Approval]) -> Result<(), ContractError> {
        let mut stored = self.approvals.write().await;
        for approval in approvals {
            stored.insert(approval.id, approval.clone());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &ApprovalId) -> Result<Option<Approval>, ContractError> {
        Ok(self.approvals.read().await.get(id).cloned())
    }

    async fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Approval>, ContractError> {
        let stored = self.approvals.read().await;
        let mut records = stored
            .values()
            .filter(|a| a.contract_id == *contract_id)
            .cloned()
            .collect::<Vec<_>>();
        sort_records(&mut records);
        Ok(records)
    }

    async fn list_for_approver(
        &self,
        approver_id: &UserId,
        status: ApprovalStatus,
    ) -> Result<Vec<Approval>, ContractError> {
        let stored = self.approvals.read().await;
        let mut records = stored
            .values()
            .filter(|a| a.approver_id == *approver_id && a.status == status)
            .cloned()
            .collect::<Vec<_>>();
        records.sort_by(|a, b| {
            a.pending_since()
                .cmp(&b.pending_since())
                .then(a.id.cmp(&b.id))
        });
        Ok(records)
    }

    async fn update_many(&self, approvals: &[Approval]) -> Result<(), ContractError> {
        let mut stored = self.approvals.write().await;
        for approval in approvals {
            match stored.get_mut(&approval.id) {
                Some(existing) => *existing = approval.clone(),
                None => {
                    return Err(ContractError::ApprovalNotFound {
                        id: approval.id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn list_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Approval>, ContractError> {
        let stored = self.approvals.read().await;
        let mut records = stored
            .values()
            .filter(|a| in_window(a.created_at, from, to))
            .cloned()
            .collect::<Vec<_>>();
        sort_records(&mut records);
        Ok(records)
    }
}
