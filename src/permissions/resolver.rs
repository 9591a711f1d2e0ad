use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::PermissionError;
use crate::cache::{CacheStore, MASTER_SCREEN, ROLE_PERMISSIONS};
use crate::database::models::{ScreenKey, User};
use crate::database::PermissionStore;
use crate::menu::{find_feature, merge_tree, MenuTree, MergeStrategy};
use crate::types::{Action, DashboardType, ObjectId};

pub const PERMISSIONS_FETCHED: &str = "Role permissions fetched successfully";

/// Merged menu tree served to a dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPermissions {
    pub message: String,
    pub data: MenuTree,
    pub dashboard_type: DashboardType,
    pub college_id: Option<ObjectId>,
}

/// Composes a user's effective permissions from the stored trees
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn PermissionStore>,
    cache: Arc<dyn CacheStore>,
}

impl PermissionResolver {
    pub fn new(store: Arc<dyn PermissionStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { store, cache }
    }

    /// Load the user, then resolve. Unknown users are `DataNotFound`.
    pub async fn resolve_for_user(
        &self,
        user_id: ObjectId,
        dashboard_type: DashboardType,
        current_college_id: Option<ObjectId>,
    ) -> Result<ResolvedPermissions, PermissionError> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| PermissionError::not_found(format!("User {}", user_id)))?;
        self.get_role_permissions(&user, dashboard_type, current_college_id)
            .await
    }

    /// Effective permission tree for `user` on `dashboard_type`.
    ///
    /// Admin dashboards start from the user's role (the college copy when
    /// the user belongs to colleges) and layer groups and the college
    /// screen on top. Every other dashboard is served straight from the
    /// college's screen for that dashboard.
    pub async fn get_role_permissions(
        &self,
        user: &User,
        dashboard_type: DashboardType,
        current_college_id: Option<ObjectId>,
    ) -> Result<ResolvedPermissions, PermissionError> {
        let field = cache_field(dashboard_type, user.id, current_college_id);
        if let Some(cached) = self
            .cache
            .get_collection_from_cache(ROLE_PERMISSIONS, &field)
            .await
        {
            match serde_json::from_value::<ResolvedPermissions>(cached) {
                Ok(resolved) => return Ok(resolved),
                Err(e) => warn!(field = %field, error = %e, "Discarding unreadable cache entry"),
            }
        }

        let data = match dashboard_type {
            DashboardType::AdminDashboard => {
                let base = self.base_role_menus(user, current_college_id).await?;
                self.mapped_role_permissions(base, user, current_college_id)
                    .await?
            }
            _ => {
                let college_id = current_college_id
                    .ok_or_else(|| PermissionError::custom("college_id is required"))?;
                let screen = self
                    .store
                    .find_screen(ScreenKey::college(dashboard_type, college_id))
                    .await?
                    .ok_or_else(|| {
                        PermissionError::not_found(format!("{} screen", dashboard_type))
                    })?;
                screen.menus.only_nodes()
            }
        };

        if data.is_empty() {
            return Err(PermissionError::DataNotFound(
                "No permissions found for this user".to_string(),
            ));
        }

        let resolved = ResolvedPermissions {
            message: PERMISSIONS_FETCHED.to_string(),
            data,
            dashboard_type,
            college_id: current_college_id,
        };
        // A write that lands between the reads above and this store leaves a
        // stale entry until the next invalidation or the TTL.
        match serde_json::to_value(&resolved) {
            Ok(value) => {
                self.cache
                    .store_collection_in_cache(value, ROLE_PERMISSIONS, &field)
                    .await
            }
            Err(e) => warn!(field = %field, error = %e, "Resolved permissions not cached"),
        }

        info!(
            user_id = %user.id,
            dashboard_type = %dashboard_type,
            features = resolved.data.len(),
            "Resolved role permissions"
        );
        Ok(resolved)
    }

    async fn base_role_menus(
        &self,
        user: &User,
        current_college_id: Option<ObjectId>,
    ) -> Result<MenuTree, PermissionError> {
        let role_id = user.role.role_id;
        if user.has_colleges() {
            let college_id = current_college_id
                .ok_or_else(|| PermissionError::custom("college_id is required"))?;
            let role = self
                .store
                .find_college_role(role_id, college_id)
                .await?
                .ok_or_else(|| PermissionError::not_found(format!("Role {}", role_id)))?;
            Ok(role.menus)
        } else {
            let role = self
                .store
                .find_role(role_id)
                .await?
                .ok_or_else(|| PermissionError::not_found(format!("Role {}", role_id)))?;
            Ok(role.menus)
        }
    }

    /// Layer the user's groups, then the current college's screen, onto `data`.
    ///
    /// Precedence is college override > group overlay > base role. The
    /// college screen takes part only for users with associated colleges,
    /// and then the current college must be one of them.
    pub async fn mapped_role_permissions(
        &self,
        mut data: MenuTree,
        user: &User,
        current_college_id: Option<ObjectId>,
    ) -> Result<MenuTree, PermissionError> {
        // (a) college screen is fetched first but applied last
        let college_data = if user.has_colleges() {
            let college_id = current_college_id
                .filter(|id| user.associated_colleges.contains(id))
                .ok_or_else(|| {
                    PermissionError::custom("College ID not found in associated colleges")
                })?;
            self.college_screen(college_id).await?
        } else {
            None
        };

        // (b) groups can only enable
        for assignment in &user.assign_group_permissions {
            let group = self
                .store
                .find_group(assignment.group_id)
                .await?
                .ok_or_else(|| {
                    PermissionError::not_found(format!("Group {}", assignment.group_id))
                })?;
            merge_tree(&mut data, &group.menus, MergeStrategy::OverlayBooleanOr);
        }

        // (c) college states win
        if let Some(college_data) = college_data {
            merge_tree(&mut data, &college_data, MergeStrategy::OverlayReplace);
        }

        Ok(data)
    }

    /// Node entries of the college's admin screen, through the cache.
    /// A college without a screen has no override.
    async fn college_screen(
        &self,
        college_id: ObjectId,
    ) -> Result<Option<MenuTree>, PermissionError> {
        let field = format!("{}/{}", DashboardType::AdminDashboard, college_id);
        if let Some(cached) = self.cache.get_collection_from_cache(MASTER_SCREEN, &field).await {
            match MenuTree::from_value(cached) {
                Ok(tree) => return Ok(Some(tree)),
                Err(e) => warn!(field = %field, error = %e, "Discarding unreadable cache entry"),
            }
        }

        let key = ScreenKey::college(DashboardType::AdminDashboard, college_id);
        let Some(screen) = self.store.find_screen(key).await? else {
            debug!(college_id = %college_id, "No college screen, skipping override");
            return Ok(None);
        };

        let tree = screen.menus.only_nodes();
        if let Ok(value) = tree.to_value() {
            self.cache
                .store_collection_in_cache(value, MASTER_SCREEN, &field)
                .await;
        }
        Ok(Some(tree))
    }

    /// Fail with `NotEnoughPermission` unless the resolved tree grants
    /// `action` on a visible `feature_id`.
    pub async fn authorize(
        &self,
        user_id: ObjectId,
        dashboard_type: DashboardType,
        current_college_id: Option<ObjectId>,
        feature_id: &str,
        action: Action,
    ) -> Result<(), PermissionError> {
        let resolved = self
            .resolve_for_user(user_id, dashboard_type, current_college_id)
            .await?;

        let node = find_feature(&resolved.data, feature_id).ok_or_else(|| {
            PermissionError::NotEnoughPermission(format!(
                "Feature {} is not available to this user",
                feature_id
            ))
        })?;
        if !node.is_visible() {
            return Err(PermissionError::NotEnoughPermission(format!(
                "Feature {} is hidden for this user",
                feature_id
            )));
        }
        if !node.allows(action) {
            return Err(PermissionError::NotEnoughPermission(format!(
                "Not enough permission to {} {}",
                action, feature_id
            )));
        }
        Ok(())
    }
}

fn cache_field(
    dashboard_type: DashboardType,
    user_id: ObjectId,
    college_id: Option<ObjectId>,
) -> String {
    match college_id {
        Some(college_id) => format!("{}/{}/{}", dashboard_type, user_id, college_id),
        None => format!("{}/{}/global", dashboard_type, user_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, NoopCache};
    use crate::database::models::{CollegeRole, Group, GroupAssignment, Role, Screen};
    use crate::database::MemoryPermissionStore;
    use crate::types::ScreenType;
    use chrono::Utc;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> MenuTree {
        serde_json::from_value(value).unwrap()
    }

    fn link(user: &mut User, group: &Group) {
        user.assign_group_permissions.push(GroupAssignment {
            group_id: group.id,
            name: group.name.clone(),
            description: None,
            created_at: Utc::now(),
        });
    }

    fn resolver(store: Arc<MemoryPermissionStore>) -> PermissionResolver {
        PermissionResolver::new(store, Arc::new(NoopCache))
    }

    #[tokio::test]
    async fn group_grants_reach_an_empty_role() {
        let store = Arc::new(MemoryPermissionStore::new());
        let role = Role::new("counselor", MenuTree::new());
        let group = Group::new(
            "G1",
            None,
            tree(json!({"reports": {"feature_id": "reports", "permissions": {"read": true}}})),
        );
        let mut user = User::new(ObjectId::new(), role.id);
        link(&mut user, &group);
        store.save_role(&role).await.unwrap();
        store.save_group(&group).await.unwrap();

        let merged = resolver(store)
            .mapped_role_permissions(role.menus.clone(), &user, None)
            .await
            .unwrap();
        let reports = merged.node("reports").unwrap();
        assert!(reports.allows(Action::Read));
    }

    #[tokio::test]
    async fn college_overrides_after_groups() {
        let store = Arc::new(MemoryPermissionStore::new());
        let college_id = ObjectId::new();
        let role_id = ObjectId::new();

        let mut college_role = CollegeRole::temp_role(role_id, college_id);
        college_role.menus =
            tree(json!({"f": {"feature_id": "f", "permissions": {"read": true}}}));
        let group = Group::new(
            "writers",
            None,
            tree(json!({"f": {"feature_id": "f", "permissions": {"write": true}}})),
        );
        let screen = Screen::new(
            ScreenType::CollegeScreen,
            DashboardType::AdminDashboard,
            Some(college_id),
            tree(json!({"f": {"feature_id": "f", "permissions": {"read": false}}})),
        );
        let mut user = User::new(ObjectId::new(), role_id);
        user.associated_colleges.push(college_id);
        link(&mut user, &group);

        store.save_college_role(&college_role).await.unwrap();
        store.save_group(&group).await.unwrap();
        store.save_screen(&screen).await.unwrap();
        store.save_user(&user).await.unwrap();

        let resolved = resolver(store)
            .resolve_for_user(user.id, DashboardType::AdminDashboard, Some(college_id))
            .await
            .unwrap();
        let f = resolved.data.node("f").unwrap();
        assert!(!f.allows(Action::Read));
        assert!(f.allows(Action::Write));
        assert_eq!(resolved.college_id, Some(college_id));
    }

    #[tokio::test]
    async fn rejects_a_college_the_user_does_not_belong_to() {
        let store = Arc::new(MemoryPermissionStore::new());
        let mut user = User::new(ObjectId::new(), ObjectId::new());
        user.associated_colleges.push(ObjectId::new());

        let err = resolver(store)
            .mapped_role_permissions(MenuTree::new(), &user, Some(ObjectId::new()))
            .await
            .unwrap_err();
        assert!(
            matches!(err, PermissionError::Custom(ref m) if m == "College ID not found in associated colleges")
        );
    }

    #[tokio::test]
    async fn missing_group_is_data_not_found() {
        let store = Arc::new(MemoryPermissionStore::new());
        let mut user = User::new(ObjectId::new(), ObjectId::new());
        link(&mut user, &Group::new("gone", None, MenuTree::new()));

        let err = resolver(store)
            .mapped_role_permissions(MenuTree::new(), &user, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PermissionError::DataNotFound(_)));
    }

    #[tokio::test]
    async fn student_dashboard_reads_the_college_screen_only() {
        let store = Arc::new(MemoryPermissionStore::new());
        let college_id = ObjectId::new();
        let screen = Screen::new(
            ScreenType::CollegeScreen,
            DashboardType::StudentDashboard,
            Some(college_id),
            tree(json!({
                "apply": {"feature_id": "apply", "permissions": {"read": true}},
                "version": 3
            })),
        );
        store.save_screen(&screen).await.unwrap();
        let user = User::new(ObjectId::new(), ObjectId::new());
        store.save_user(&user).await.unwrap();
        let resolver = resolver(store);

        let resolved = resolver
            .resolve_for_user(user.id, DashboardType::StudentDashboard, Some(college_id))
            .await
            .unwrap();
        assert_eq!(resolved.data.keys().collect::<Vec<_>>(), vec!["apply"]);

        let err = resolver
            .resolve_for_user(user.id, DashboardType::StudentDashboard, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PermissionError::Custom(_)));
    }

    #[tokio::test]
    async fn empty_result_is_data_not_found() {
        let store = Arc::new(MemoryPermissionStore::new());
        let role = Role::new("empty", MenuTree::new());
        let user = User::new(ObjectId::new(), role.id);
        store.save_role(&role).await.unwrap();
        store.save_user(&user).await.unwrap();

        let err = resolver(store)
            .resolve_for_user(user.id, DashboardType::AdminDashboard, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PermissionError::DataNotFound(_)));
    }

    #[tokio::test]
    async fn serves_repeat_requests_from_the_cache() {
        let store = Arc::new(MemoryPermissionStore::new());
        let role = Role::new(
            "counselor",
            tree(json!({"leads": {"feature_id": "leads", "permissions": {"read": true}}})),
        );
        let user = User::new(ObjectId::new(), role.id);
        store.save_role(&role).await.unwrap();
        store.save_user(&user).await.unwrap();
        let cache = Arc::new(MemoryCache::new(None));
        let resolver = PermissionResolver::new(store.clone(), cache.clone());

        let first = resolver
            .resolve_for_user(user.id, DashboardType::AdminDashboard, None)
            .await
            .unwrap();

        let mut changed = role.clone();
        changed.menus = MenuTree::new();
        store.save_role(&changed).await.unwrap();
        let second = resolver
            .resolve_for_user(user.id, DashboardType::AdminDashboard, None)
            .await
            .unwrap();
        assert_eq!(first, second);

        cache.cache_invalidation(ROLE_PERMISSIONS).await;
        assert!(resolver
            .resolve_for_user(user.id, DashboardType::AdminDashboard, None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn authorize_checks_visibility_and_flags() {
        let store = Arc::new(MemoryPermissionStore::new());
        let role = Role::new(
            "counselor",
            tree(json!({
                "leads": {"feature_id": "leads", "permissions": {"read": true, "write": false}},
                "hidden": {"feature_id": "hidden", "visibility": false, "permissions": {"read": true}}
            })),
        );
        let user = User::new(ObjectId::new(), role.id);
        store.save_role(&role).await.unwrap();
        store.save_user(&user).await.unwrap();
        let resolver = resolver(store);
        let admin = DashboardType::AdminDashboard;

        assert!(resolver.authorize(user.id, admin, None, "leads", Action::Read).await.is_ok());
        for (feature, action) in [
            ("leads", Action::Write),
            ("leads", Action::Delete),
            ("hidden", Action::Read),
            ("missing", Action::Read),
        ] {
            let err = resolver
                .authorize(user.id, admin, None, feature, action)
                .await
                .unwrap_err();
            assert!(matches!(err, PermissionError::NotEnoughPermission(_)));
        }
    }
}
