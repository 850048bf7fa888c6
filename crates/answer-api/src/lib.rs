//! 问答社区 HTTP 服务
//!
//! 提供权限查询、内容管理、投票、搜索和徽章查询的 REST API。

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;
