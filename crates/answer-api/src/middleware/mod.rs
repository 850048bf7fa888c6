//! 中间件

mod auth;

pub use auth::auth_middleware;
