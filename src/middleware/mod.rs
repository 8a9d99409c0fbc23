pub mod auth;
pub mod cookie;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use cookie::cookie_to_header_middleware;
pub use response::{ApiResponse, ApiResult, IntoApiResponse};
