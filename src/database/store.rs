use async_trait::async_trait;
use thiserror::Error;

use super::models::{CollegeRole, Group, GroupAssignment, Role, Screen, ScreenKey, User};
use crate::types::ObjectId;

/// Errors from a permission store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Corrupt document in {collection}: {message}")]
    Corrupt { collection: &'static str, message: String },

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence seam for roles, groups, college overrides, screens and users.
///
/// Single-document writes replace the whole document (last writer wins).
/// The two linkage operations update the user and every group touched as
/// one unit.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn find_role(&self, id: ObjectId) -> Result<Option<Role>, StoreError>;
    async fn save_role(&self, role: &Role) -> Result<(), StoreError>;

    async fn find_group(&self, id: ObjectId) -> Result<Option<Group>, StoreError>;
    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, StoreError>;
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;
    /// Fails with [`StoreError::Duplicate`] when the name is taken
    async fn insert_group(&self, group: &Group) -> Result<(), StoreError>;
    async fn save_group(&self, group: &Group) -> Result<(), StoreError>;
    /// Delete the group and drop it from every user's assignments.
    /// Returns false when no such group existed.
    async fn delete_group(&self, id: ObjectId) -> Result<bool, StoreError>;

    async fn find_college_role(
        &self,
        role_id: ObjectId,
        college_id: ObjectId,
    ) -> Result<Option<CollegeRole>, StoreError>;
    async fn save_college_role(&self, role: &CollegeRole) -> Result<(), StoreError>;

    async fn find_screen(&self, key: ScreenKey) -> Result<Option<Screen>, StoreError>;
    async fn save_screen(&self, screen: &Screen) -> Result<(), StoreError>;

    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, StoreError>;
    async fn save_user(&self, user: &User) -> Result<(), StoreError>;

    /// Append assignments to the user and the user to each group, skipping
    /// links that already exist. Returns the assignments actually added.
    async fn link_user_groups(
        &self,
        user_id: ObjectId,
        assignments: &[GroupAssignment],
    ) -> Result<Vec<GroupAssignment>, StoreError>;

    /// Remove the link on both sides. Returns false when it did not exist.
    async fn unlink_user_group(
        &self,
        user_id: ObjectId,
        group_id: ObjectId,
    ) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
