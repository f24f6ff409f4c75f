//! Comment repository traits

use async_trait::async_trait;

use crate::domain::contract::{ContractError, ContractId};

use super::entities::{Comment, CommentId};

/// Comment persistence
#[async_trait]
pub trait ICommentRepository: Send + Sync {
    /// Insert a comment
    async fn create(&self, comment: &Comment) -> Result<(), ContractError>;

    /// Find a comment by ID
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, ContractError>;

    /// Comments on a contract, oldest first
    async fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Comment>, ContractError>;

    /// Persist an edited body
    async fn update(&self, comment: &Comment) -> Result<(), ContractError>;

    /// Delete a comment
    async fn delete(&self, id: &CommentId) -> Result<(), ContractError>;

    /// Whether any comment replies to this one
    async fn has_replies(&self, id: &CommentId) -> Result<bool, ContractError>;
}
