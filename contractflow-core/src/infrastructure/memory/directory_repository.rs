//! In-memory user directory and reference data

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::directory::{
    DirectoryError, IReferenceRepository, IUserRepository, Reference, ReferenceId, ReferenceType,
    User, UserId,
};

/// In-memory user directory
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn active_matching(&self, predicate: impl Fn(&User) -> bool) -> Vec<User> {
        let users = self.users.read().await;
        let mut matching = users
            .values()
            .filter(|u| u.active && predicate(u))
            .cloned()
            .collect::<Vec<_>>();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        matching
    }
}

#[async_trait]
impl IUserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DirectoryError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_role(&self, role: &str) -> Result<Vec<User>, DirectoryError> {
        Ok(self.active_matching(|u| u.has_role(role)).await)
    }

    async fn find_by_department(&self, department: &str) -> Result<Vec<User>, DirectoryError> {
        Ok(self
            .active_matching(|u| {
                u.department
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(department))
            })
            .await)
    }

    async fn list_active(&self) -> Result<Vec<User>, DirectoryError> {
        Ok(self.active_matching(|_| true).await)
    }

    async fn create(&self, user: &User) -> Result<(), DirectoryError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(DirectoryError::EmailAlreadyExists {
                email: user.email.clone(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}

/// In-memory reference data
#[derive(Default)]
pub struct InMemoryReferenceRepository {
    references: RwLock<HashMap<ReferenceId, Reference>>,
}

impl InMemoryReferenceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IReferenceRepository for InMemoryReferenceRepository {
    async fn find_by_type(
        &self,
        ref_type: &ReferenceType,
    ) -> Result<Vec<Reference>, DirectoryError> {
        let references = self.references.read().await;
        let mut rows = references
            .values()
            .filter(|r| r.active && r.ref_type == *ref_type)
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        Ok(rows)
    }

    async fn create(&self, reference: &Reference) -> Result<(), DirectoryError> {
        let mut references = self.references.write().await;
        if references
            .values()
            .any(|r| r.ref_type == reference.ref_type && r.code == reference.code)
        {
            return Err(DirectoryError::ReferenceAlreadyExists {
                ref_type: reference.ref_type.to_string(),
                code: reference.code.clone(),
            });
        }
        references.insert(reference.id, reference.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_role_lookup_skips_inactive_and_sorts() {
        let repo = InMemoryUserRepository::new();
        let zed = User::new("Zed", "zed@example.com", "legal", None);
        let amy = User::new("Amy", "amy@example.com", "Legal", None);
        let mut gone = User::new("Gus", "gus@example.com", "legal", None);
        gone.active = false;
        for u in [&zed, &amy, &gone] {
            repo.create(u).await.unwrap();
        }

        let legal = repo.find_by_role("legal").await.unwrap();
        let names = legal.iter().map(|u| u.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Amy", "Zed"]);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(&User::new("A", "a@example.com", "legal", None))
            .await
            .unwrap();
        let err = repo
            .create(&User::new("B", "A@example.com", "legal", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::EmailAlreadyExists { .. }));
    }
}
