//! Directory repository traits

use async_trait::async_trait;

use super::entities::{Reference, User};
use super::errors::DirectoryError;
use super::value_objects::{ReferenceType, UserId};

/// User directory
#[async_trait]
pub trait IUserRepository: Send + Sync {
    /// Find a user by ID (active or not)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DirectoryError>;

    /// Active users holding a role, sorted by name
    async fn find_by_role(&self, role: &str) -> Result<Vec<User>, DirectoryError>;

    /// Active users in a department, sorted by name
    async fn find_by_department(&self, department: &str) -> Result<Vec<User>, DirectoryError>;

    /// All active users, sorted by name
    async fn list_active(&self) -> Result<Vec<User>, DirectoryError>;

    /// Insert a user
    async fn create(&self, user: &User) -> Result<(), DirectoryError>;
}

/// Reference (lookup table) data
#[async_trait]
pub trait IReferenceRepository: Send + Sync {
    /// Active rows of one type, sorted by `sort_order` then name
    async fn find_by_type(&self, ref_type: &ReferenceType) -> Result<Vec<Reference>, DirectoryError>;

    /// Insert a row
    async fn create(&self, reference: &Reference) -> Result<(), DirectoryError>;
}
