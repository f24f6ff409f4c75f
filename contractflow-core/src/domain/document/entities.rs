//! Document domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::contract::{ContractError, ContractId};
use crate::domain::directory::UserId;

define_id!(
    /// Document version ID
    DocumentId
);

/// Maximum file name length
pub const FILE_NAME_MAX_LENGTH: usize = 255;

/// Metadata supplied when registering a new version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub checksum: Option<String>,
    /// Where the file body lives (object storage key, URL, ...)
    pub storage_uri: String,
    pub note: Option<String>,
}

impl DocumentMetadata {
    /// Validate against the configured size limit and content types
    pub fn validate(
        &self,
        max_size_bytes: u64,
        allowed_content_types: &[String],
    ) -> Result<(), ContractError> {
        let name = self.file_name.trim();
        if name.is_empty() || name.chars().count() > FILE_NAME_MAX_LENGTH {
            return Err(ContractError::validation(
                "file_name",
                format!("must be between 1 and {} characters", FILE_NAME_MAX_LENGTH),
            ));
        }

        if self.size_bytes == 0 {
            return Err(ContractError::validation("size_bytes", "file is empty"));
        }
        if self.size_bytes > max_size_bytes {
            return Err(ContractError::validation(
                "size_bytes",
                format!("exceeds the limit of {} bytes", max_size_bytes),
            ));
        }

        let allowed = allowed_content_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(self.content_type.trim()));
        if !allowed {
            return Err(ContractError::validation(
                "content_type",
                format!("'{}' is not an accepted document type", self.content_type),
            ));
        }

        if self.storage_uri.trim().is_empty() {
            return Err(ContractError::validation("storage_uri", "cannot be empty"));
        }

        Ok(())
    }
}

/// One registered version of a contract's document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDocument {
    pub id: DocumentId,
    pub contract_id: ContractId,
    /// Starts at 1, one higher than the previous version
    pub version: u32,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub checksum: Option<String>,
    pub storage_uri: String,
    pub note: Option<String>,
    pub uploaded_by: UserId,
    pub uploaded_at: DateTime<Utc>,
}

impl ContractDocument {
    pub fn new(
        contract_id: ContractId,
        version: u32,
        metadata: DocumentMetadata,
        uploaded_by: UserId,
    ) -> Self {
        Self {
            id: DocumentId::generate(),
            contract_id,
            version,
            file_name: metadata.file_name.trim().to_string(),
            content_type: metadata.content_type.trim().to_ascii_lowercase(),
            size_bytes: metadata.size_bytes,
            checksum: metadata.checksum.filter(|c| !c.trim().is_empty()),
            storage_uri: metadata.storage_uri.trim().to_string(),
            note: metadata.note.filter(|n| !n.trim().is_empty()),
            uploaded_by,
            uploaded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            file_name: "msa-v1.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 2048,
            checksum: None,
            storage_uri: "s3://contracts/msa-v1.pdf".to_string(),
            note: None,
        }
    }

    fn allowed() -> Vec<String> {
        vec!["application/pdf".to_string(), "text/plain".to_string()]
    }

    #[test]
    fn test_valid_metadata() {
        assert!(metadata().validate(4096, &allowed()).is_ok());
    }

    #[test]
    fn test_size_limits() {
        let mut m = metadata();
        m.size_bytes = 0;
        assert!(m.validate(4096, &allowed()).is_err());
        m.size_bytes = 4097;
        assert!(m.validate(4096, &allowed()).is_err());
        m.size_bytes = 4096;
        assert!(m.validate(4096, &allowed()).is_ok());
    }

    #[test]
    fn test_file_name_and_content_type() {
        let mut m = metadata();
        m.file_name = "x".repeat(256);
        assert!(m.validate(4096, &allowed()).is_err());

        let mut m = metadata();
        m.content_type = "image/png".to_string();
        let err = m.validate(4096, &allowed()).unwrap_err();
        assert!(matches!(err, ContractError::Validation { field, .. } if field == "content_type"));
    }
}
