use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::models::{CollegeRole, Group, Role, Screen, User};
use super::store::{PermissionStore, StoreError};
use crate::types::ScreenType;

/// Seed documents for a store, loaded from a JSON or YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub roles: Vec<Role>,
    pub groups: Vec<Group>,
    pub college_roles: Vec<CollegeRole>,
    pub screens: Vec<Screen>,
    pub users: Vec<User>,
}

impl Fixture {
    /// Load from disk. `.yaml`/`.yml` files are parsed as YAML, anything
    /// else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Fixture(format!("{}: {}", path.display(), e)))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Self::from_yaml(&raw)
        } else {
            Self::from_json(&raw)
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::Fixture(e.to_string()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, StoreError> {
        serde_yaml::from_str(raw).map_err(|e| StoreError::Fixture(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
            && self.groups.is_empty()
            && self.college_roles.is_empty()
            && self.screens.is_empty()
            && self.users.is_empty()
    }

    /// Document counts in a stable order, for logs and the CLI
    pub fn counts(&self) -> [(&'static str, usize); 5] {
        [
            ("roles", self.roles.len()),
            ("groups", self.groups.len()),
            ("college_roles", self.college_roles.len()),
            ("screens", self.screens.len()),
            ("users", self.users.len()),
        ]
    }

    /// Cross-document references that would fail at resolve time.
    /// Empty when the fixture is consistent.
    pub fn problems(&self) -> Vec<String> {
        let role_ids: HashSet<_> = self.roles.iter().map(|r| r.id).collect();
        let group_ids: HashSet<_> = self.groups.iter().map(|g| g.id).collect();
        let mut problems = Vec::new();

        let mut names = HashSet::new();
        for group in &self.groups {
            if !names.insert(group.name.as_str()) {
                problems.push(format!("group name '{}' is used more than once", group.name));
            }
        }

        for college_role in &self.college_roles {
            if !role_ids.contains(&college_role.role_id) {
                problems.push(format!(
                    "college role {} points at unknown role {}",
                    college_role.id, college_role.role_id
                ));
            }
        }

        for screen in &self.screens {
            match (screen.screen_type, screen.college_id) {
                (ScreenType::MasterScreen, Some(_)) => problems.push(format!(
                    "master screen {} must not carry a college_id",
                    screen.id
                )),
                (ScreenType::CollegeScreen | ScreenType::ClientScreen, None) => problems.push(
                    format!("{} {} has no college_id", screen.screen_type, screen.id),
                ),
                _ => {}
            }
        }

        for user in &self.users {
            if !role_ids.contains(&user.role.role_id) {
                problems.push(format!(
                    "user {} has unknown role {}",
                    user.id, user.role.role_id
                ));
            }
            for assignment in &user.assign_group_permissions {
                if !group_ids.contains(&assignment.group_id) {
                    problems.push(format!(
                        "user {} is assigned unknown group {}",
                        user.id, assignment.group_id
                    ));
                }
            }
        }
        problems
    }

    /// Write every document into `store`, replacing existing ones by id
    pub async fn apply(&self, store: &dyn PermissionStore) -> Result<(), StoreError> {
        for role in &self.roles {
            store.save_role(role).await?;
        }
        for group in &self.groups {
            store.save_group(group).await?;
        }
        for college_role in &self.college_roles {
            store.save_college_role(college_role).await?;
        }
        for screen in &self.screens {
            store.save_screen(screen).await?;
        }
        for user in &self.users {
            store.save_user(user).await?;
        }
        Ok(())
    }
}
