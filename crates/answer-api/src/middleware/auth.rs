//! 认证中间件
//!
//! 解析可选的 Bearer Token 和 `Accept-Language`，构造 `RequestContext` 放入请求扩展。
//! 没有 Token 按匿名处理；带了 Token 但校验失败返回 401。
//! 响应返回前按请求语言填写统一响应体的 `msg`。

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{AuthUser, RequestContext};
use crate::error::ApiError;
use crate::i18n::Language;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let language = request
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|h| h.to_str().ok())
        .map(Language::from_accept_language)
        .unwrap_or_default();

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let user = match auth_header {
        None => None,
        Some(value) => {
            let Some(token) = value.strip_prefix(BEARER_PREFIX) else {
                let err = ApiError::Unauthorized("Authorization 头格式错误".to_string());
                return state.messages.localize(err.into_response(), language);
            };
            match state.jwt.verify_token(token.trim()) {
                Ok(claims) => Some(AuthUser::from(claims)),
                Err(e) => return state.messages.localize(e.into_response(), language),
            }
        }
    };

    request
        .extensions_mut()
        .insert(RequestContext { user, language });

    let response = next.run(request).await;
    state.messages.localize(response, language)
}
