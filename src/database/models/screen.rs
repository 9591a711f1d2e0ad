use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::menu::MenuTree;
use crate::types::{DashboardType, ObjectId, ScreenType};

/// A stored menu tree for one dashboard: the master template, or a college
/// or client copy of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: ObjectId,
    pub screen_type: ScreenType,
    pub dashboard_type: DashboardType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_id: Option<ObjectId>,
    #[serde(default)]
    pub menus: MenuTree,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Screen {
    pub fn new(
        screen_type: ScreenType,
        dashboard_type: DashboardType,
        college_id: Option<ObjectId>,
        menus: MenuTree,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            screen_type,
            dashboard_type,
            college_id,
            menus,
            updated_at: Utc::now(),
        }
    }

    /// Lookup key: master screens have no owner
    pub fn key(&self) -> ScreenKey {
        ScreenKey {
            screen_type: self.screen_type,
            dashboard_type: self.dashboard_type,
            college_id: self.college_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenKey {
    pub screen_type: ScreenType,
    pub dashboard_type: DashboardType,
    pub college_id: Option<ObjectId>,
}

impl ScreenKey {
    pub fn master(dashboard_type: DashboardType) -> Self {
        Self {
            screen_type: ScreenType::MasterScreen,
            dashboard_type,
            college_id: None,
        }
    }

    pub fn college(dashboard_type: DashboardType, college_id: ObjectId) -> Self {
        Self {
            screen_type: ScreenType::CollegeScreen,
            dashboard_type,
            college_id: Some(college_id),
        }
    }
}
