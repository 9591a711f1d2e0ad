use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PermissionTree;
use crate::menu::MenuTree;
use crate::types::ObjectId;

/// Named, reusable bundle of menu grants assignable to many users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_id", alias = "id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
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

impl Group {
    pub fn new(name: impl Into<String>, description: Option<String>, menus: MenuTree) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name: name.into(),
            description,
            menus,
            user_permissions: Vec::new(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            feature_count: self.menus.nodes().count(),
            user_count: self.user_permissions.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl PermissionTree for Group {
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

/// Listing view of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: ObjectId,
    pub name: String,
    pub description: Option<String>,
    pub feature_count: usize,
    pub user_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
