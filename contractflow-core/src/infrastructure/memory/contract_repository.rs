//! In-memory contract repository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::contract::{
    Contract, ContractError, ContractFilter, ContractHistoryEntry, ContractId, ContractStatus,
    IContractRepository,
};
use crate::domain::workflow::WorkflowId;

use super::in_window;

/// In-memory contract repository
#[derive(Default)]
pub struct InMemoryContractRepository {
    contracts: RwLock<HashMap<ContractId, Contract>>,
    history: RwLock<Vec<ContractHistoryEntry>>,
}

impl InMemoryContractRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn active_where(&self, predicate: impl Fn(&Contract) -> bool) -> Vec<Contract> {
        let contracts = self.contracts.read().await;
        let mut matching = contracts
            .values()
            .filter(|c| c.status == ContractStatus::Active && predicate(c))
            .cloned()
            .collect::<Vec<_>>();
        matching.sort_by(|a, b| a.end_date.cmp(&b.end_date).then(a.id.cmp(&b.id)));
        matching
    }
}

#[async_trait]
impl IContractRepository for InMemoryContractRepository {
    async fn find_by_id(&self, id: &ContractId) -> Result<Option<Contract>, ContractError> {
        Ok(self.contracts.read().await.get(id).cloned())
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Contract>, ContractError> {
        Ok(self
            .contracts
            .read()
            .await
            .values()
            .find(|c| c.contract_number.as_str() == number)
            .cloned())
    }

    async fn list(&self, filter: &ContractFilter) -> Result<(Vec<Contract>, u64), ContractError> {
        let contracts = self.contracts.read().await;
        let mut matching = contracts
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect::<Vec<_>>();
        matching.sort_by(|a, b| filter.compare(a, b));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn create(&self, contract: &Contract) -> Result<(), ContractError> {
        let mut contracts = self.contracts.write().await;
        if contracts
            .values()
            .any(|c| c.contract_number == contract.contract_number)
        {
            return Err(ContractError::DuplicateNumber {
                number: contract.contract_number.to_string(),
            });
        }
        contracts.insert(contract.id, contract.clone());
        Ok(())
    }

    async fn update(&self, contract: &Contract) -> Result<(), ContractError> {
        let mut contracts = self.contracts.write().await;
        match contracts.get_mut(&contract.id) {
            Some(existing) => {
                *existing = contract.clone();
                Ok(())
            }
            None => Err(ContractError::NotFound {
                id: contract.id.to_string(),
            }),
        }
    }

    async fn delete(&self, id: &ContractId) -> Result<(), ContractError> {
        if self.contracts.write().await.remove(id).is_none() {
            return Err(ContractError::NotFound { id: id.to_string() });
        }
        self.history.write().await.retain(|e| e.contract_id != *id);
        Ok(())
    }

    async fn append_history(&self, entry: &ContractHistoryEntry) -> Result<(), ContractError> {
        self.history.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_history(
        &self,
        id: &ContractId,
    ) -> Result<Vec<ContractHistoryEntry>, ContractError> {
        let history = self.history.read().await;
        let mut entries = history
            .iter()
            .filter(|e| e.contract_id == *id)
            .cloned()
            .collect::<Vec<_>>();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn find_active_ending_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Contract>, ContractError> {
        Ok(self
            .active_where(|c| c.end_date >= from && c.end_date <= to)
            .await)
    }

    async fn find_active_ended_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Contract>, ContractError> {
        Ok(self.active_where(|c| c.end_date < date).await)
    }

    async fn count_with_workflow(
        &self,
        workflow_id: &WorkflowId,
        status: ContractStatus,
    ) -> Result<u64, ContractError> {
        Ok(self
            .contracts
            .read()
            .await
            .values()
            .filter(|c| c.status == status && c.workflow_id == Some(*workflow_id))
            .count() as u64)
    }

    async fn list_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Contract>, ContractError> {
        let contracts = self.contracts.read().await;
        let mut matching = contracts
            .values()
            .filter(|c| in_window(c.created_at, from, to))
            .cloned()
            .collect::<Vec<_>>();
        matching.sort_by_key(|c| c.created_at);
        Ok(matching)
    }
}
