use chrono::Utc;
use std::sync::Arc;

use crate::cache::{CacheStore, ROLE_PERMISSIONS};
use crate::database::models::GroupAssignment;
use crate::database::PermissionStore;
use crate::permissions::PermissionError;
use crate::types::ObjectId;

const LINKS_TARGET: &str = "crm_roles_api::links";

/// Maintains the user ↔ group link on both documents
#[derive(Clone)]
pub struct GroupLinkService {
    store: Arc<dyn PermissionStore>,
    cache: Arc<dyn CacheStore>,
}

impl GroupLinkService {
    pub fn new(store: Arc<dyn PermissionStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { store, cache }
    }

    /// Assign each group to the user. Groups the user already has are
    /// skipped; the assignments actually added are returned.
    pub async fn get_assigned_permissions(
        &self,
        user_id: ObjectId,
        group_ids: &[ObjectId],
    ) -> Result<Vec<GroupAssignment>, PermissionError> {
        if group_ids.is_empty() {
            return Err(PermissionError::custom("group_ids must not be empty"));
        }
        if self.store.find_user(user_id).await?.is_none() {
            return Err(PermissionError::not_found(format!("User {}", user_id)));
        }

        let mut assignments = Vec::with_capacity(group_ids.len());
        for group_id in group_ids {
            let group = self
                .store
                .find_group(*group_id)
                .await?
                .ok_or_else(|| PermissionError::not_found(format!("Group {}", group_id)))?;
            assignments.push(GroupAssignment {
                group_id: group.id,
                name: group.name,
                description: group.description,
                created_at: Utc::now(),
            });
        }

        let added = self.store.link_user_groups(user_id, &assignments).await?;
        for assignment in &added {
            tracing::info!(
                target: LINKS_TARGET,
                user_id = %user_id,
                group_id = %assignment.group_id,
                "Linked user to group"
            );
        }

        self.cache.cache_invalidation(ROLE_PERMISSIONS).await;
        Ok(added)
    }

    /// Unassign a group from the user
    pub async fn remove_feature_group(
        &self,
        user_id: ObjectId,
        group_id: ObjectId,
    ) -> Result<(), PermissionError> {
        if !self.store.unlink_user_group(user_id, group_id).await? {
            return Err(PermissionError::Custom(format!(
                "Group {} is not assigned to user {}",
                group_id, user_id
            )));
        }
        tracing::info!(
            target: LINKS_TARGET,
            user_id = %user_id,
            group_id = %group_id,
            "Unlinked user from group"
        );

        self.cache.cache_invalidation(ROLE_PERMISSIONS).await;
        Ok(())
    }
}
