//! 统一响应体
//!
//! 所有接口返回 `{code, reason, msg, data}`，`code` 与 HTTP 状态码一致。
//! `msg` 由 `MessageRegistry::localize` 按请求语言填写，这里只写入 reason 作为兜底。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUCCESS_REASON: &str = "base.success";

/// 响应信封
///
/// 同时放入响应扩展，供本地化中间件重写 `msg`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub code: u16,
    pub reason: String,
    pub msg: String,
    pub data: Value,
}

impl Envelope {
    pub fn new(status: StatusCode, reason: impl Into<String>, data: Value) -> Self {
        let reason = reason.into();
        Self {
            code: status.as_u16(),
            msg: reason.clone(),
            reason,
            data,
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(&self)).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// 新建对象的 ID
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// 成功响应
#[derive(Debug)]
pub struct ApiResponse<T>(pub T);

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self(data)
    }
}

impl ApiResponse<()> {
    pub fn success_empty() -> Self {
        Self(())
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(self.0) {
            Ok(data) => Envelope::new(StatusCode::OK, SUCCESS_REASON, data).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "响应数据序列化失败");
                Envelope::new(StatusCode::INTERNAL_SERVER_ERROR, "base.unknown", Value::Null)
                    .into_response()
            }
        }
    }
}
