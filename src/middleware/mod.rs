pub mod auth;
pub mod response;

pub use auth::require_auth;
pub use response::{ApiResponse, ApiResult};
