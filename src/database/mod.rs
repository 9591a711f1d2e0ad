pub mod fixture;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use fixture::Fixture;
pub use memory::MemoryPermissionStore;
pub use postgres::PgPermissionStore;
pub use store::{PermissionStore, StoreError};
