use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ObjectId;

/// Permission-relevant slice of a CRM user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: ObjectId,
    pub role: UserRole,
    #[serde(default)]
    pub assign_group_permissions: Vec<GroupAssignment>,
    #[serde(default)]
    pub associated_colleges: Vec<ObjectId>,
}

impl User {
    pub fn new(id: ObjectId, role_id: ObjectId) -> Self {
        Self {
            id,
            role: UserRole { role_id },
            assign_group_permissions: Vec::new(),
            associated_colleges: Vec::new(),
        }
    }

    pub fn has_colleges(&self) -> bool {
        !self.associated_colleges.is_empty()
    }

    pub fn is_in_group(&self, group_id: ObjectId) -> bool {
        self.assign_group_permissions
            .iter()
            .any(|a| a.group_id == group_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub role_id: ObjectId,
}

/// User-side half of the user ↔ group link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAssignment {
    pub group_id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
