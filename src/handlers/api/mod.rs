// handlers/api/mod.rs - Permission and administration endpoints (/api/*)
pub mod features;
pub mod groups;
pub mod permissions;
pub mod screens;
pub mod users;
