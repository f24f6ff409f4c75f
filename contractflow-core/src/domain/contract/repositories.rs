//! Contract repository traits

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::workflow::WorkflowId;

use super::entities::{Contract, ContractFilter, ContractHistoryEntry};
use super::errors::ContractError;
use super::value_objects::{ContractId, ContractStatus};

/// Contract repository trait for contract persistence
#[async_trait]
pub trait IContractRepository: Send + Sync {
    /// Find a contract by ID
    async fn find_by_id(&self, id: &ContractId) -> Result<Option<Contract>, ContractError>;

    /// Find a contract by its number
    async fn find_by_number(&self, number: &str) -> Result<Option<Contract>, ContractError>;

    /// List contracts matching a filter, returning the page and the total match count
    async fn list(&self, filter: &ContractFilter) -> Result<(Vec<Contract>, u64), ContractError>;

    /// Create a new contract
    async fn create(&self, contract: &Contract) -> Result<(), ContractError>;

    /// Update an existing contract
    async fn update(&self, contract: &Contract) -> Result<(), ContractError>;

    /// Delete a contract and everything hanging off it
    async fn delete(&self, id: &ContractId) -> Result<(), ContractError>;

    /// Append an audit entry
    async fn append_history(&self, entry: &ContractHistoryEntry) -> Result<(), ContractError>;

    /// Audit entries for a contract, oldest first
    async fn list_history(&self, id: &ContractId)
    -> Result<Vec<ContractHistoryEntry>, ContractError>;

    /// `Active` contracts whose end date falls in `[from, to]`, soonest first
    async fn find_active_ending_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Contract>, ContractError>;

    /// `Active` contracts whose end date is strictly before `date`
    async fn find_active_ended_before(&self, date: NaiveDate)
    -> Result<Vec<Contract>, ContractError>;

    /// Number of contracts in `status` routed through a workflow
    async fn count_with_workflow(
        &self,
        workflow_id: &WorkflowId,
        status: ContractStatus,
    ) -> Result<u64, ContractError>;

    /// Contracts created in `[from, to)`; open ends are unbounded
    async fn list_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Contract>, ContractError>;
}
