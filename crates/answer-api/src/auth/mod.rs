//! 认证模块
//!
//! JWT 签发与校验，以及请求级的用户上下文。

mod context;
mod jwt;

pub use context::{AuthUser, RequestContext};
pub use jwt::{Claims, JwtConfig, JwtManager};
