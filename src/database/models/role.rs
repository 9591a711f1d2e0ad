use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PermissionTree;
use crate::menu::MenuTree;
use crate::types::ObjectId;

/// Global role: the base menu tree every holder of the role starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "_id", alias = "id")]
    pub id: ObjectId,
    pub role_name: String,
    #[serde(default)]
    pub menus: MenuTree,
    #[serde(default)]
    pub user_permissions: Vec<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ObjectId>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(role_name: impl Into<String>, menus: MenuTree) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            role_name: role_name.into(),
            menus,
            user_permissions: Vec::new(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl PermissionTree for Role {
    fn menus(&self) -> &MenuTree {
        &self.menus
    }

    fn menus_mut(&mut self) -> &mut MenuTree {
        &mut self.menus
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// College-specific override of a global role, keyed by `(role_id, college_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeRole {
    #[serde(rename = "_id", alias = "id")]
    pub id: ObjectId,
    pub role_id: ObjectId,
    pub college_id: ObjectId,
    pub role_name: String,
    #[serde(default)]
    pub menus: MenuTree,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl CollegeRole {
    /// Empty override created the first time a college customizes a role
    pub fn temp_role(role_id: ObjectId, college_id: ObjectId) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            role_id,
            college_id,
            role_name: "temp_role".to_string(),
            menus: MenuTree::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl PermissionTree for CollegeRole {
    fn menus(&self) -> &MenuTree {
        &self.menus
    }

    fn menus_mut(&mut self) -> &mut MenuTree {
        &mut self.menus
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
