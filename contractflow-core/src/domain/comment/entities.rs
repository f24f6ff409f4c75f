//! Comment domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::contract::{ContractError, ContractId};
use crate::domain::directory::UserId;

define_id!(
    /// Comment ID
    CommentId
);

/// Maximum comment body length
pub const BODY_MAX_LENGTH: usize = 5000;

fn validated_body(body: &str) -> Result<String, ContractError> {
    let body = body.trim();
    if body.is_empty() || body.chars().count() > BODY_MAX_LENGTH {
        return Err(ContractError::validation(
            "body",
            format!("must be between 1 and {} characters", BODY_MAX_LENGTH),
        ));
    }
    Ok(body.to_string())
}

/// A discussion entry on a contract, optionally replying to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub contract_id: ContractId,
    pub author_id: UserId,
    pub body: String,
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn new(
        contract_id: ContractId,
        author_id: UserId,
        body: &str,
        parent_id: Option<CommentId>,
    ) -> Result<Self, ContractError> {
        Ok(Self {
            id: CommentId::generate(),
            contract_id,
            author_id,
            body: validated_body(body)?,
            parent_id,
            created_at: Utc::now(),
            edited_at: None,
        })
    }

    /// Replace the body; only the author may do this
    pub fn edit(&mut self, editor: &UserId, body: &str) -> Result<(), ContractError> {
        if self.author_id != *editor {
            return Err(ContractError::permission_denied(
                "only the author can edit a comment",
            ));
        }
        self.body = validated_body(body)?;
        self.edited_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_bounds() {
        let contract = ContractId::generate();
        let author = UserId::generate();
        assert!(Comment::new(contract, author, "  ", None).is_err());
        assert!(Comment::new(contract, author, &"a".repeat(5001), None).is_err());
        let c = Comment::new(contract, author, " Looks good ", None).unwrap();
        assert_eq!(c.body, "Looks good");
    }

    #[test]
    fn test_only_author_edits() {
        let author = UserId::generate();
        let mut c = Comment::new(ContractId::generate(), author, "first", None).unwrap();

        let err = c.edit(&UserId::generate(), "hijack").unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(c.body, "first");

        c.edit(&author, "second").unwrap();
        assert_eq!(c.body, "second");
        assert!(c.edited_at.is_some());
    }
}
