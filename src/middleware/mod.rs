pub mod response;

pub use response::{ApiResponse, ApiResult, Detail};
