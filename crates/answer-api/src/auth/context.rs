//! 请求上下文
//!
//! 认证中间件为每个请求构造一次 `RequestContext` 并放入请求扩展，处理器通过提取器取得强类型的当前用户。

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::Claims;
use crate::error::ApiError;
use crate::i18n::Language;

/// 已认证用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// 请求级上下文，`user` 为 None 表示匿名访问
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<AuthUser>,
    pub language: Language,
}

impl RequestContext {
    /// 当前用户 ID，匿名时为空字符串
    pub fn user_id(&self) -> &str {
        self.user.as_ref().map(|u| u.user_id.as_str()).unwrap_or_default()
    }

    /// 要求已登录
    pub fn require_user(&self) -> Result<&AuthUser, ApiError> {
        self.user
            .as_ref()
            .ok_or_else(|| ApiError::Unauthorized("需要登录".to_string()))
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
