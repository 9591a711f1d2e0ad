pub mod features;
pub mod fixture;
pub mod groups;
pub mod permissions;
