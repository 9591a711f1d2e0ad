use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::fixture::Fixture;
use super::models::{CollegeRole, Group, GroupAssignment, Role, Screen, ScreenKey, User};
use super::store::{PermissionStore, StoreError};
use crate::types::ObjectId;

#[derive(Debug, Default)]
struct MemoryState {
    roles: BTreeMap<ObjectId, Role>,
    groups: BTreeMap<ObjectId, Group>,
    college_roles: HashMap<(ObjectId, ObjectId), CollegeRole>,
    screens: HashMap<ScreenKey, Screen>,
    users: BTreeMap<ObjectId, User>,
}

/// Process-local store used for development, fixtures and tests.
///
/// Every operation takes the single lock once, so linkage updates are
/// atomic with respect to other requests.
#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
    state: RwLock<MemoryState>,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        let mut state = MemoryState::default();
        for role in fixture.roles {
            state.roles.insert(role.id, role);
        }
        for group in fixture.groups {
            state.groups.insert(group.id, group);
        }
        for college_role in fixture.college_roles {
            state
                .college_roles
                .insert((college_role.role_id, college_role.college_id), college_role);
        }
        for screen in fixture.screens {
            state.screens.insert(screen.key(), screen);
        }
        for user in fixture.users {
            state.users.insert(user.id, user);
        }
        tracing::info!(
            roles = state.roles.len(),
            groups = state.groups.len(),
            screens = state.screens.len(),
            users = state.users.len(),
            "Seeded in-memory permission store"
        );
        Self { state: RwLock::new(state) }
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn find_role(&self, id: ObjectId) -> Result<Option<Role>, StoreError> {
        Ok(self.state.read().await.roles.get(&id).cloned())
    }

    async fn save_role(&self, role: &Role) -> Result<(), StoreError> {
        self.state.write().await.roles.insert(role.id, role.clone());
        Ok(())
    }

    async fn find_group(&self, id: ObjectId) -> Result<Option<Group>, StoreError> {
        Ok(self.state.read().await.groups.get(&id).cloned())
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, StoreError> {
        let state = self.state.read().await;
        Ok(state.groups.values().find(|g| g.name == name).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.state.read().await.groups.values().cloned().collect())
    }

    async fn insert_group(&self, group: &Group) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.groups.values().any(|g| g.name == group.name) {
            return Err(StoreError::Duplicate(format!("group name '{}'", group.name)));
        }
        state.groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn save_group(&self, group: &Group) -> Result<(), StoreError> {
        self.state.write().await.groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn delete_group(&self, id: ObjectId) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.groups.remove(&id).is_none() {
            return Ok(false);
        }
        for user in state.users.values_mut() {
            user.assign_group_permissions.retain(|a| a.group_id != id);
        }
        Ok(true)
    }

    async fn find_college_role(
        &self,
        role_id: ObjectId,
        college_id: ObjectId,
    ) -> Result<Option<CollegeRole>, StoreError> {
        let state = self.state.read().await;
        Ok(state.college_roles.get(&(role_id, college_id)).cloned())
    }

    async fn save_college_role(&self, role: &CollegeRole) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .college_roles
            .insert((role.role_id, role.college_id), role.clone());
        Ok(())
    }

    async fn find_screen(&self, key: ScreenKey) -> Result<Option<Screen>, StoreError> {
        Ok(self.state.read().await.screens.get(&key).cloned())
    }

    async fn save_screen(&self, screen: &Screen) -> Result<(), StoreError> {
        self.state.write().await.screens.insert(screen.key(), screen.clone());
        Ok(())
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.state.write().await.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn link_user_groups(
        &self,
        user_id: ObjectId,
        assignments: &[GroupAssignment],
    ) -> Result<Vec<GroupAssignment>, StoreError> {
        let mut state = self.state.write().await;
        let MemoryState { users, groups, .. } = &mut *state;

        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;
        if let Some(missing) = assignments.iter().find(|a| !groups.contains_key(&a.group_id)) {
            return Err(StoreError::NotFound(format!("group {}", missing.group_id)));
        }

        let mut added = Vec::new();
        for assignment in assignments {
            if user.is_in_group(assignment.group_id) {
                continue;
            }
            user.assign_group_permissions.push(assignment.clone());
            if let Some(group) = groups.get_mut(&assignment.group_id) {
                if !group.user_permissions.contains(&user_id) {
                    group.user_permissions.push(user_id);
                }
            }
            added.push(assignment.clone());
        }
        Ok(added)
    }

    async fn unlink_user_group(
        &self,
        user_id: ObjectId,
        group_id: ObjectId,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let MemoryState { users, groups, .. } = &mut *state;

        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;
        let before = user.assign_group_permissions.len();
        user.assign_group_permissions.retain(|a| a.group_id != group_id);
        let removed = user.assign_group_permissions.len() != before;

        if let Some(group) = groups.get_mut(&group_id) {
            group.user_permissions.retain(|id| *id != user_id);
        }
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
