pub mod group_links;
pub mod role_admin;

pub use group_links::GroupLinkService;
pub use role_admin::{CreateGroupRequest, RoleAdminService, UpdateOutcome};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::permissions::PermissionError;

/// Which kind of document a tree edit addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    Role,
    Group,
}

impl TreeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeKind::Role => "role",
            TreeKind::Group => "group",
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the singular and plural route segments
impl FromStr for TreeKind {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "role" | "roles" => Ok(TreeKind::Role),
            "group" | "groups" => Ok(TreeKind::Group),
            other => Err(PermissionError::Custom(format!(
                "Unknown kind '{}', expected roles or groups",
                other
            ))),
        }
    }
}
