//! SQLx implementation of the document repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::contract::{ContractError, ContractId};
use crate::domain::directory::UserId;
use crate::domain::document::{ContractDocument, DocumentId, IDocumentRepository};

use super::{to_i32, to_u32, violates};

const DOCUMENT_COLUMNS: &str = "id, contract_id, version, file_name, content_type, size_bytes, \
     checksum, storage_uri, note, uploaded_by, uploaded_at";

/// Database row for the contract_documents table
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    contract_id: Uuid,
    version: i32,
    file_name: String,
    content_type: String,
    size_bytes: i64,
    checksum: Option<String>,
    storage_uri: String,
    note: Option<String>,
    uploaded_by: Uuid,
    uploaded_at: DateTime<Utc>,
}

fn corrupt(message: String) -> ContractError {
    tracing::error!("Corrupt document row: {}", message);
    ContractError::DatabaseError { message }
}

fn database_error(context: &str, e: sqlx::Error) -> ContractError {
    tracing::error!("Database error {}: {}", context, e);
    ContractError::DatabaseError {
        message: e.to_string(),
    }
}

fn row_to_document(row: DocumentRow) -> Result<ContractDocument, ContractError> {
    Ok(ContractDocument {
        id: DocumentId::from(row.id),
        contract_id: ContractId::from(row.contract_id),
        version: to_u32(row.version, "version").map_err(corrupt)?,
        file_name: row.file_name,
        content_type: row.content_type,
        size_bytes: u64::try_from(row.size_bytes)
            .map_err(|_| corrupt(format!("Stored size is negative: {}", row.size_bytes)))?,
        checksum: row.checksum,
        storage_uri: row.storage_uri,
        note: row.note,
        uploaded_by: UserId::from(row.uploaded_by),
        uploaded_at: row.uploaded_at,
    })
}

/// SQLx implementation of the document repository
pub struct SqlxDocumentRepository {
    pool: Arc<PgPool>,
}

impl SqlxDocumentRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IDocumentRepository for SqlxDocumentRepository {
    async fn create(&self, document: &ContractDocument) -> Result<(), ContractError> {
        let size = i64::try_from(document.size_bytes)
            .map_err(|_| ContractError::validation("size_bytes", "too large"))?;

        sqlx::query(
            r#"
            INSERT INTO contract_documents (id, contract_id, version, file_name, content_type,
                size_bytes, checksum, storage_uri, note, uploaded_by, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(document.id.as_uuid())
        .bind(document.contract_id.as_uuid())
        .bind(to_i32(document.version, "version").map_err(corrupt)?)
        .bind(&document.file_name)
        .bind(&document.content_type)
        .bind(size)
        .bind(&document.checksum)
        .bind(&document.storage_uri)
        .bind(&document.note)
        .bind(document.uploaded_by.as_uuid())
        .bind(document.uploaded_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "idx_contract_documents_version") {
                return ContractError::validation(
                    "version",
                    format!("version {} already exists", document.version),
                );
            }
            database_error("creating document", e)
        })?;

        Ok(())
    }

    async fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<ContractDocument>, ContractError> {
        let sql = format!(
            "SELECT {} FROM contract_documents WHERE contract_id = $1 ORDER BY version DESC",
            DOCUMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(contract_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| database_error("listing documents", e))?;
        rows.into_iter().map(row_to_document).collect()
    }

    async fn find_version(
        &self,
        contract_id: &ContractId,
        version: u32,
    ) -> Result<Option<ContractDocument>, ContractError> {
        let Ok(version) = i32::try_from(version) else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT {} FROM contract_documents WHERE contract_id = $1 AND version = $2",
            DOCUMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(contract_id.as_uuid())
            .bind(version)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| database_error("finding document version", e))?;
        row.map(row_to_document).transpose()
    }

    async fn max_version(&self, contract_id: &ContractId) -> Result<Option<u32>, ContractError> {
        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(version) FROM contract_documents WHERE contract_id = $1")
                .bind(contract_id.as_uuid())
                .fetch_one(&*self.pool)
                .await
                .map_err(|e| database_error("reading latest document version", e))?;

        max.map(|v| to_u32(v, "version").map_err(corrupt)).transpose()
    }
}
