//! Contract discussion threads

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::comment::{Comment, CommentId, ICommentRepository};
use crate::domain::contract::{ContractError, ContractId, HistoryAction, IContractRepository};
use crate::domain::directory::UserId;
use crate::domain::notification::NotificationKind;

use super::contracts::load_contract;
use super::notifications::NotificationService;

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn ICommentRepository>,
    contracts: Arc<dyn IContractRepository>,
    notifications: NotificationService,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn ICommentRepository>,
        contracts: Arc<dyn IContractRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            comments,
            contracts,
            notifications,
        }
    }

    async fn load(&self, id: &CommentId) -> Result<Comment, ContractError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ContractError::CommentNotFound { id: id.to_string() })
    }

    /// Post a comment, optionally replying to another one on the same contract
    #[instrument(skip(self, body), fields(contract_id = %contract_id, author = %author))]
    pub async fn add(
        &self,
        contract_id: &ContractId,
        author: UserId,
        body: &str,
        parent_id: Option<CommentId>,
    ) -> Result<Comment, ContractError> {
        let contract = load_contract(self.contracts.as_ref(), contract_id).await?;

        if let Some(parent_id) = &parent_id {
            let parent = self.load(parent_id).await?;
            if parent.contract_id != *contract_id {
                return Err(ContractError::validation(
                    "parent_id",
                    "parent comment belongs to another contract",
                ));
            }
        }

        let comment = Comment::new(*contract_id, author, body, parent_id)?;
        self.comments.create(&comment).await?;
        self.contracts
            .append_history(&contract.record(HistoryAction::CommentAdded, Some(author), None))
            .await?;

        if contract.created_by != author {
            self.notifications
                .notify_or_warn(
                    contract.created_by,
                    NotificationKind::CommentAdded,
                    &contract,
                    format!("New comment on {}", contract.contract_number),
                    preview(&comment.body),
                )
                .await;
        }

        info!(comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    /// Thread in chronological order
    pub async fn list(&self, contract_id: &ContractId) -> Result<Vec<Comment>, ContractError> {
        load_contract(self.contracts.as_ref(), contract_id).await?;
        self.comments.list_for_contract(contract_id).await
    }

    #[instrument(skip(self, body), fields(comment_id = %id, editor = %editor))]
    pub async fn edit(
        &self,
        id: &CommentId,
        editor: UserId,
        body: &str,
    ) -> Result<Comment, ContractError> {
        let mut comment = self.load(id).await?;
        comment.edit(&editor, body)?;
        self.comments.update(&comment).await?;
        Ok(comment)
    }

    #[instrument(skip(self), fields(comment_id = %id, actor = %actor))]
    pub async fn delete(&self, id: &CommentId, actor: UserId) -> Result<(), ContractError> {
        let comment = self.load(id).await?;
        if comment.author_id != actor {
            return Err(ContractError::permission_denied(
                "only the author can delete a comment",
            ));
        }
        if self.comments.has_replies(id).await? {
            return Err(ContractError::CommentHasReplies { id: id.to_string() });
        }

        self.comments.delete(id).await?;
        info!(comment_id = %id, "Comment deleted");
        Ok(())
    }
}

fn preview(body: &str) -> String {
    const LIMIT: usize = 140;
    if body.chars().count() <= LIMIT {
        body.to_string()
    } else {
        let cut = body.chars().take(LIMIT).collect::<String>();
        format!("{}...", cut)
    }
}
