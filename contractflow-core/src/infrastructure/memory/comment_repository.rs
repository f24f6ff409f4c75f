//! In-memory comment repository

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::comment::{Comment, CommentId, ICommentRepository};
use crate::domain::contract::{ContractError, ContractId};

/// In-memory comment repository
#[derive(Default)]
pub struct InMemoryCommentRepository {
    comments: RwLock<HashMap<CommentId, Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ICommentRepository for InMemoryCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<(), ContractError> {
        self.comments
            .write()
            .await
            .insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, ContractError> {
        Ok(self.comments.read().await.get(id).cloned())
    }

    async fn list_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Comment>, ContractError> {
        let comments = self.comments.read().await;
        let mut listed = comments
            .values()
            .filter(|c| c.contract_id == *contract_id)
            .cloned()
            .collect::<Vec<_>>();
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(listed)
    }

    async fn update(&self, comment: &Comment) -> Result<(), ContractError> {
        let mut comments = self.comments.write().await;
        match comments.get_mut(&comment.id) {
            Some(existing) => {
                *existing = comment.clone();
                Ok(())
            }
            None => Err(ContractError::CommentNotFound {
                id: comment.id.to_string(),
            }),
        }
    }

    async fn delete(&self, id: &CommentId) -> Result<(), ContractError> {
        match self.comments.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(ContractError::CommentNotFound { id: id.to_string() }),
        }
    }

    async fn has_replies(&self, id: &CommentId) -> Result<bool, ContractError> {
        Ok(self
            .comments
            .read()
            .await
            .values()
            .any(|c| c.parent_id == Some(*id)))
    }
}
