pub mod group;
pub mod role;
pub mod screen;
pub mod user;

pub use group::{Group, GroupSummary};
pub use role::{CollegeRole, Role};
pub use screen::{Screen, ScreenKey};
pub use user::{GroupAssignment, User, UserRole};

use crate::menu::MenuTree;

/// Common view over documents that own a menu tree
pub trait PermissionTree {
    fn menus(&self) -> &MenuTree;
    fn menus_mut(&mut self) -> &mut MenuTree;
    /// Bump `updated_at`
    fn touch(&mut self);
}
