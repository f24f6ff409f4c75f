//! Document versioning use cases

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::DocumentsConfig;
use crate::domain::contract::{
    ContractError, ContractId, ContractStatus, HistoryAction, IContractRepository,
};
use crate::domain::directory::UserId;
use crate::domain::document::{ContractDocument, DocumentMetadata, IDocumentRepository};

use super::contracts::load_contract;

#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn IDocumentRepository>,
    contracts: Arc<dyn IContractRepository>,
    config: DocumentsConfig,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn IDocumentRepository>,
        contracts: Arc<dyn IContractRepository>,
        config: DocumentsConfig,
    ) -> Self {
        Self {
            documents,
            contracts,
            config,
        }
    }

    /// Register the next version of a contract's document
    #[instrument(skip(self, metadata), fields(contract_id = %contract_id, actor = %actor))]
    pub async fn add_version(
        &self,
        contract_id: &ContractId,
        metadata: DocumentMetadata,
        actor: UserId,
    ) -> Result<ContractDocument, ContractError> {
        let contract = load_contract(self.contracts.as_ref(), contract_id).await?;
        if matches!(
            contract.status,
            ContractStatus::Expired | ContractStatus::Terminated
        ) {
            return Err(ContractError::NotEditable {
                status: contract.status,
            });
        }

        metadata.validate(
            self.config.max_size_bytes,
            &self.config.allowed_content_types,
        )?;

        let version = self
            .documents
            .max_version(contract_id)
            .await?
            .map_or(1, |v| v + 1);
        let document = ContractDocument::new(*contract_id, version, metadata, actor);
        self.documents.create(&document).await?;

        self.contracts
            .append_history(&contract.record(
                HistoryAction::DocumentAdded,
                Some(actor),
                Some(format!("v{} {}", document.version, document.file_name)),
            ))
            .await?;

        info!(
            document_id = %document.id,
            version = document.version,
            "Document version added"
        );
        Ok(document)
    }

    /// All versions, newest first
    pub async fn list(&self, contract_id: &ContractId) -> Result<Vec<ContractDocument>, ContractError> {
        load_contract(self.contracts.as_ref(), contract_id).await?;
        self.documents.list_for_contract(contract_id).await
    }

    pub async fn get_version(
        &self,
        contract_id: &ContractId,
        version: u32,
    ) -> Result<ContractDocument, ContractError> {
        self.documents
            .find_version(contract_id, version)
            .await?
            .ok_or_else(|| ContractError::DocumentNotFound {
                contract_id: contract_id.to_string(),
                version,
            })
    }

    pub async fn latest(
        &self,
        contract_id: &ContractId,
    ) -> Result<Option<ContractDocument>, ContractError> {
        Ok(self.list(contract_id).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::{Contract, ContractNumber, ContractTerms, Money};
    use crate::infrastructure::Repositories;
    use chrono::NaiveDate;

    async fn setup() -> (Repositories, DocumentService, Contract) {
        let repos = Repositories::in_memory();
        let service = DocumentService::new(
            repos.documents.clone(),
            repos.contracts.clone(),
            DocumentsConfig::default(),
        );
        let terms = ContractTerms {
            title: "Master Services".to_string(),
            description: None,
            counterparty: "Globex".to_string(),
            contract_type: "services".to_string(),
            department: None,
            value: Money::new(5_000, "EUR").unwrap(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
        };
        let contract = Contract::new(
            ContractNumber::new("MSA-2025").unwrap(),
            terms,
            UserId::generate(),
        );
        repos.contracts.create(&contract).await.unwrap();
        (repos, service, contract)
    }

    fn metadata(name: &str) -> DocumentMetadata {
        DocumentMetadata {
            file_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 1024,
            checksum: Some("abc123".to_string()),
            storage_uri: format!("s3://docs/{}", name),
            note: None,
        }
    }

    #[tokio::test]
    async fn test_versions_increment_and_list_newest_first() {
        let (repos, service, contract) = setup().await;
        let actor = contract.created_by;

        let v1 = service
            .add_version(&contract.id, metadata("draft.pdf"), actor)
            .await
            .unwrap();
        let v2 = service
            .add_version(&contract.id, metadata("final.pdf"), actor)
            .await
            .unwrap();
        assert_eq!((v1.version, v2.version), (1, 2));

        let listed = service.list(&contract.id).await.unwrap();
        assert_eq!(
            listed.iter().map(|d| d.version).collect::<Vec<_>>(),
            vec![2, 1]
        );
        assert_eq!(
            service.latest(&contract.id).await.unwrap().map(|d| d.version),
            Some(2)
        );
        assert_eq!(
            service.get_version(&contract.id, 1).await.unwrap().file_name,
            "draft.pdf"
        );
        assert!(matches!(
            service.get_version(&contract.id, 9).await,
            Err(ContractError::DocumentNotFound { version: 9, .. })
        ));

        let history = repos.contracts.list_history(&contract.id).await.unwrap();
        assert_eq!(
            history
                .iter()
                .filter(|h| h.action == HistoryAction::DocumentAdded)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_rejects_closed_contracts_and_bad_metadata() {
        let (repos, service, mut contract) = setup().await;
        let actor = contract.created_by;

        let mut too_big = metadata("huge.pdf");
        too_big.size_bytes = DocumentsConfig::default().max_size_bytes + 1;
        assert!(matches!(
            service.add_version(&contract.id, too_big, actor).await,
            Err(ContractError::Validation { .. })
        ));

        contract.status = ContractStatus::Terminated;
        repos.contracts.update(&contract).await.unwrap();
        assert!(matches!(
            service
                .add_version(&contract.id, metadata("late.pdf"), actor)
                .await,
            Err(ContractError::NotEditable { .. })
        ));
        assert_eq!(service.latest(&contract.id).await.unwrap(), None);
    }
}
