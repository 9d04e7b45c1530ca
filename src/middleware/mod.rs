pub mod auth;
pub mod response;
pub mod tenant_boundary;

pub use auth::principal_middleware;
pub use response::{ApiResponse, ApiResult};
pub use tenant_boundary::tenant_boundary_middleware;
