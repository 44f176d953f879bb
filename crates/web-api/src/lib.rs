//! Web API 层。
//!
//! 提供 Axum 路由，统一的响应信封与错误映射，以及 JWT 认证提取器，
//! 请求最终委托给应用层的用例服务。

mod auth;
mod auth_routes;
mod club_routes;
mod error;
mod extract;
mod file_routes;
mod post_routes;
mod response;
mod routes;
mod state;
mod user_routes;

pub use auth::{Claims, JwtProvider, TokenInfo};
pub use error::ApiError;
pub use response::{ApiResponse, ResponseStatus};
pub use routes::{cors_layer, router};
pub use state::AppState;
