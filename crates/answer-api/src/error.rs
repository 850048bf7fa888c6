//! HTTP 层错误类型
//!
//! 每个错误映射到一个 HTTP 状态码和 reason 键；系统错误只返回通用 reason，详细信息仅记录日志。

use answer_service::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::dto::Envelope;

pub const REASON_RANK_NOT_MET: &str = "rank_fail_to_meet_the_condition";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 声望不足，`required` 为操作所需声望（未知时为 None）
    #[error("声望不足")]
    RankNotMet { required: Option<i64> },

    #[error("禁止访问: {0}")]
    Forbidden(String),

    #[error("未授权: {0}")]
    Unauthorized(String),

    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("对象不存在: {0}")]
    NotFound(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RankNotMet { .. } | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::NotFound(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::RankNotMet { .. } => REASON_RANK_NOT_MET,
            Self::Forbidden(_) => "base.forbidden",
            Self::Unauthorized(_) => "base.unauthorized_error",
            Self::Validation(_) => "base.request_format_error",
            Self::NotFound(_) => "base.object_not_found",
            Self::Internal(_) => "base.unknown",
        }
    }

    fn data(&self) -> Value {
        match self {
            Self::RankNotMet { required } => json!({ "requiredRank": required }),
            Self::Validation(detail) => json!({ "error": detail }),
            _ => Value::Null,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, "请求处理失败"),
            other => tracing::debug!(error = %other, "请求被拒绝"),
        }

        Envelope::new(self.status_code(), self.reason(), self.data()).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::UserNotFound(_)
            | ServiceError::ObjectNotFound(_)
            | ServiceError::BadgeNotFound(_)
            | ServiceError::InvalidObjectId(_) => Self::NotFound(err.to_string()),
            ServiceError::UnknownAction(_) | ServiceError::Validation(_) => {
                Self::Validation(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_rank_not_met_response() {
        let response = ApiError::RankNotMet { required: Some(10) }.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let json = body_json(response).await;
        assert_eq!(json["code"], 403);
        assert_eq!(json["reason"], "rank_fail_to_meet_the_condition");
        assert_eq!(json["data"]["requiredRank"], 10);
    }

    #[test]
    fn test_status_and_reason_mapping() {
        let cases = [
            (ApiError::Forbidden("x".into()), 403, "base.forbidden"),
            (ApiError::Unauthorized("x".into()), 401, "base.unauthorized_error"),
            (ApiError::Validation("x".into()), 400, "base.request_format_error"),
            (ApiError::NotFound("x".into()), 400, "base.object_not_found"),
            (ApiError::Internal("x".into()), 500, "base.unknown"),
        ];
        for (err, status, reason) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err}");
            assert_eq!(err.reason(), reason);
        }
    }

    #[tokio::test]
    async fn test_internal_error_is_opaque() {
        let err: ApiError = ServiceError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, ApiError::Internal(_)));

        let json = body_json(err.into_response()).await;
        assert_eq!(json["reason"], "base.unknown");
        assert_eq!(json["data"], Value::Null);
        assert!(!json.to_string().contains("pool"));
    }

    #[test]
    fn test_from_service_error() {
        assert!(matches!(
            ApiError::from(ServiceError::ObjectNotFound("1".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(ServiceError::UnknownAction("x".into())),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from(ServiceError::InvalidObjectId("abc".into())),
            ApiError::NotFound(_)
        ));
    }
}
