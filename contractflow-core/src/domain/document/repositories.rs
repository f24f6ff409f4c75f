//! Document repository traits

use async_trait::async_trait;

use crate::domain::contract::{ContractError, ContractId};

use super::entities::ContractDocument;

/// Document version persistence
#[async_trait]
pub trait IDocumentRepository: Send + Sync {
    /// Insert a new version; fails if the version number is taken
    async fn create(&self, document: &ContractDocument) -> Result<(), ContractError>;

    /// Every version of a contract's document, newest first
    async fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<ContractDocument>, ContractError>;

    /// One specific version
    async fn find_version(
        &self,
        contract_id: &ContractId,
        version: u32,
    ) -> Result<Option<ContractDocument>, ContractError>;

    /// Highest version number registered so far
    async fn max_version(&self, contract_id: &ContractId) -> Result<Option<u32>, ContractError>;
}
