use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use super::TreeKind;
use crate::cache::{CacheStore, MASTER_SCREEN, ROLE_PERMISSIONS};
use crate::database::models::{
    CollegeRole, Group, GroupSummary, PermissionTree, Role, Screen, ScreenKey,
};
use crate::database::PermissionStore;
use crate::menu::{
    find_feature, recursive_check, temp_data_func, update_role_controller, MenuPatch, MenuTree,
    ScreenDetail, TreeEdit,
};
use crate::permissions::PermissionError;
use crate::types::{DashboardType, ObjectId, ScreenType};

/// Body of a create/update feature-group request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub screen_details: Vec<ScreenDetail>,
    #[serde(default)]
    pub created_by: Option<ObjectId>,
}

/// Result of a field update that may have had nothing to do
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(MenuTree),
    NothingToUpdate,
}

/// A loaded document whose tree is being edited
enum TreeDoc {
    Role(Role),
    CollegeRole(CollegeRole),
    Group(Group),
}

impl TreeDoc {
    fn tree(&self) -> &dyn PermissionTree {
        match self {
            TreeDoc::Role(role) => role,
            TreeDoc::CollegeRole(role) => role,
            TreeDoc::Group(group) => group,
        }
    }

    fn tree_mut(&mut self) -> &mut dyn PermissionTree {
        match self {
            TreeDoc::Role(role) => role,
            TreeDoc::CollegeRole(role) => role,
            TreeDoc::Group(group) => group,
        }
    }
}

/// Administration of roles, groups and screens. Every write drops the
/// resolved-permission cache.
#[derive(Clone)]
pub struct RoleAdminService {
    store: Arc<dyn PermissionStore>,
    cache: Arc<dyn CacheStore>,
}

impl RoleAdminService {
    pub fn new(store: Arc<dyn PermissionStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { store, cache }
    }

    /// Create a group from `screen_details`, or with `update` fold the new
    /// features into the existing group of that name.
    ///
    /// The update path replaces whole top-level entries; it does not merge
    /// nested features.
    pub async fn create_feature_group(
        &self,
        request: CreateGroupRequest,
        update: bool,
    ) -> Result<Group, PermissionError> {
        let existing = self.store.find_group_by_name(&request.name).await?;
        if existing.is_some() && !update {
            return Err(PermissionError::custom("Group already exists"));
        }
        if request.screen_details.is_empty() {
            return Err(PermissionError::custom("screen_details must not be empty"));
        }

        let menus = self.reformat(&request.screen_details).await?;

        let group = match existing {
            Some(mut group) => {
                group.menus.update_top_level(menus);
                if request.description.is_some() {
                    group.description = request.description;
                }
                group.touch();
                self.store.save_group(&group).await?;
                info!(group_id = %group.id, name = %group.name, "Updated feature group");
                group
            }
            None => {
                let mut group = Group::new(request.name, request.description, menus);
                group.created_by = request.created_by;
                self.store.insert_group(&group).await.map_err(|e| match e {
                    crate::database::StoreError::Duplicate(_) => {
                        PermissionError::custom("Group already exists")
                    }
                    other => other.into(),
                })?;
                info!(group_id = %group.id, name = %group.name, "Created feature group");
                group
            }
        };

        self.cache.cache_invalidation(ROLE_PERMISSIONS).await;
        Ok(group)
    }

    /// Fold `screen_details` into a role's tree, or into its college copy
    /// when `college_id` is given. The college copy is created on first use.
    pub async fn update_role_feature(
        &self,
        role_id: ObjectId,
        screen_details: &[ScreenDetail],
        college_id: Option<ObjectId>,
    ) -> Result<MenuTree, PermissionError> {
        if screen_details.is_empty() {
            return Err(PermissionError::custom("screen_details must not be empty"));
        }
        let mut role = self
            .store
            .find_role(role_id)
            .await?
            .ok_or_else(|| PermissionError::not_found(format!("Role {}", role_id)))?;

        let patch = self.reformat_patch(screen_details).await?;

        let menus = match college_id {
            Some(college_id) => {
                let mut college_role = self
                    .store
                    .find_college_role(role_id, college_id)
                    .await?
                    .unwrap_or_else(|| CollegeRole::temp_role(role_id, college_id));
                college_role.menus.merge_patch(&patch)?;
                college_role.touch();
                self.store.save_college_role(&college_role).await?;
                college_role.menus
            }
            None => {
                role.menus.merge_patch(&patch)?;
                role.touch();
                self.store.save_role(&role).await?;
                role.menus
            }
        };

        info!(role_id = %role_id, college_id = ?college_id.map(|c| c.to_hex()), "Updated role features");
        self.cache.cache_invalidation(ROLE_PERMISSIONS).await;
        Ok(menus)
    }

    /// Overwrite `fields` on the feature `feature_id`, wherever it sits in
    /// the tree
    pub async fn update_role_specific_fields(
        &self,
        kind: TreeKind,
        id: ObjectId,
        feature_id: &str,
        fields: &Map<String, Value>,
        college_id: Option<ObjectId>,
    ) -> Result<UpdateOutcome, PermissionError> {
        if fields.is_empty() {
            return Ok(UpdateOutcome::NothingToUpdate);
        }

        let mut doc = self.load_doc(kind, id, college_id).await?;
        let updated = recursive_check(doc.tree().menus(), feature_id, TreeEdit::Patch(fields))?
            .ok_or_else(|| {
                PermissionError::Custom(format!("Feature {} not found in {}", feature_id, kind))
            })?;

        *doc.tree_mut().menus_mut() = updated.clone();
        doc.tree_mut().touch();
        self.save_doc(&doc).await?;

        info!(kind = %kind, id = %id, feature_id, "Updated feature fields");
        self.cache.cache_invalidation(ROLE_PERMISSIONS).await;
        Ok(UpdateOutcome::Updated(updated))
    }

    /// List a role's or group's features, or only the subtree rooted at
    /// `feature_id`
    pub async fn get_role_features(
        &self,
        kind: TreeKind,
        id: ObjectId,
        feature_id: Option<&str>,
        college_id: Option<ObjectId>,
    ) -> Result<Vec<Value>, PermissionError> {
        let doc = self.load_doc(kind, id, college_id).await?;
        let menus = doc.tree().menus();

        match feature_id {
            Some(feature_id) => {
                let node = find_feature(menus, feature_id).ok_or_else(|| {
                    PermissionError::not_found(format!("Feature {} in {}", feature_id, kind))
                })?;
                let mut subtree = MenuTree::new();
                subtree.insert_node(node.clone());
                Ok(temp_data_func(&subtree)?)
            }
            None => Ok(temp_data_func(menus)?),
        }
    }

    /// Remove one feature from a group, or the whole group (and every user
    /// link to it) when no feature is named
    pub async fn delete_feature_group(
        &self,
        group_id: ObjectId,
        feature_id: Option<&str>,
    ) -> Result<(), PermissionError> {
        match feature_id {
            Some(feature_id) => {
                let mut group = self
                    .store
                    .find_group(group_id)
                    .await?
                    .ok_or_else(|| PermissionError::not_found(format!("Group {}", group_id)))?;
                group.menus = recursive_check(&group.menus, feature_id, TreeEdit::Remove)?
                    .ok_or_else(|| {
                        PermissionError::Custom(format!("Feature {} not found in group", feature_id))
                    })?;
                group.touch();
                self.store.save_group(&group).await?;
                info!(group_id = %group_id, feature_id, "Removed feature from group");
            }
            None => {
                if !self.store.delete_group(group_id).await? {
                    return Err(PermissionError::not_found(format!("Group {}", group_id)));
                }
                info!(group_id = %group_id, "Deleted feature group");
            }
        }

        self.cache.cache_invalidation(ROLE_PERMISSIONS).await;
        Ok(())
    }

    pub async fn list_feature_groups(&self) -> Result<Vec<GroupSummary>, PermissionError> {
        let groups = self.store.list_groups().await?;
        Ok(groups.iter().map(Group::summary).collect())
    }

    /// Replace the tree of a master, college or client screen.
    ///
    /// Master screens are unowned; the other types need a `college_id`.
    pub async fn upsert_screen(
        &self,
        screen_type: ScreenType,
        dashboard_type: DashboardType,
        college_id: Option<ObjectId>,
        menus: MenuTree,
    ) -> Result<Screen, PermissionError> {
        match (screen_type, college_id) {
            (ScreenType::MasterScreen, Some(_)) => {
                return Err(PermissionError::custom("master_screen does not take a college_id"))
            }
            (ScreenType::CollegeScreen | ScreenType::ClientScreen, None) => {
                return Err(PermissionError::custom("college_id is required"))
            }
            _ => {}
        }

        let key = ScreenKey {
            screen_type,
            dashboard_type,
            college_id,
        };
        let screen = match self.store.find_screen(key).await? {
            Some(mut existing) => {
                existing.menus = menus;
                existing.updated_at = chrono::Utc::now();
                existing
            }
            None => Screen::new(screen_type, dashboard_type, college_id, menus),
        };
        self.store.save_screen(&screen).await?;

        info!(screen_type = %screen_type, dashboard_type = %dashboard_type, "Saved screen");
        self.cache.cache_invalidation(MASTER_SCREEN).await;
        self.cache.cache_invalidation(ROLE_PERMISSIONS).await;
        Ok(screen)
    }

    async fn master_tree(&self) -> Result<MenuTree, PermissionError> {
        let screen = self
            .store
            .find_screen(ScreenKey::master(DashboardType::AdminDashboard))
            .await?
            .ok_or_else(|| PermissionError::not_found("admin_dashboard master screen"))?;
        Ok(screen.menus)
    }

    async fn reformat_patch(&self, details: &[ScreenDetail]) -> Result<MenuPatch, PermissionError> {
        let master = self.master_tree().await?;
        let mut patch = MenuPatch::new();
        update_role_controller(details, &mut patch, &master)?;
        Ok(patch)
    }

    async fn reformat(&self, details: &[ScreenDetail]) -> Result<MenuTree, PermissionError> {
        let patch = self.reformat_patch(details).await?;
        Ok(MenuTree::from_patch(&patch)?)
    }

    async fn load_doc(
        &self,
        kind: TreeKind,
        id: ObjectId,
        college_id: Option<ObjectId>,
    ) -> Result<TreeDoc, PermissionError> {
        let doc = match (kind, college_id) {
            (TreeKind::Group, _) => self.store.find_group(id).await?.map(TreeDoc::Group),
            (TreeKind::Role, None) => self.store.find_role(id).await?.map(TreeDoc::Role),
            (TreeKind::Role, Some(college_id)) => self
                .store
                .find_college_role(id, college_id)
                .await?
                .map(TreeDoc::CollegeRole),
        };
        doc.ok_or_else(|| PermissionError::not_found(format!("{} {}", kind, id)))
    }

    async fn save_doc(&self, doc: &TreeDoc) -> Result<(), PermissionError> {
        match doc {
            TreeDoc::Role(role) => self.store.save_role(role).await?,
            TreeDoc::CollegeRole(role) => self.store.save_college_role(role).await?,
            TreeDoc::Group(group) => self.store.save_group(group).await?,
        }
        Ok(())
    }
}
