//! In-memory document repository

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::contract::{ContractError, ContractId};
use crate::domain::document::{ContractDocument, IDocumentRepository};

/// In-memory document repository, keyed by contract
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<HashMap<ContractId, Vec<ContractDocument>>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IDocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, document: &ContractDocument) -> Result<(), ContractError> {
        let mut documents = self.documents.write().await;
        let versions = documents.entry(document.contract_id).or_default();
        if versions.iter().any(|d| d.version == document.version) {
            return Err(ContractError::validation(
                "version",
                format!("version {} already exists", document.version),
            ));
        }
        versions.push(document.clone());
        Ok(())
    }

    async fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<ContractDocument>, ContractError> {
        let documents = self.documents.read().await;
        let mut versions = documents.get(contract_id).cloned().unwrap_or_default();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    async fn find_version(
        &self,
        contract_id: &ContractId,
        version: u32,
    ) -> Result<Option<ContractDocument>, ContractError> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(contract_id)
            .and_then(|versions| versions.iter().find(|d| d.version == version))
            .cloned())
    }

    async fn max_version(&self, contract_id: &ContractId) -> Result<Option<u32>, ContractError> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(contract_id)
            .and_then(|versions| versions.iter().map(|d| d.version).max()))
    }
}
