//! 领域服务错误类型
//!
//! 区分业务错误（对象不存在、参数非法等，可直接提示用户）和系统错误（数据库、缓存等）。
//! 每个错误带有一个用于 API 响应的 reason 键，由 HTTP 层翻译成用户可读的消息。

use answer_shared::error::AnswerError;
use thiserror::Error;

/// 领域服务错误类型
#[derive(Debug, Error)]
pub enum ServiceError {
    // === 业务错误 ===
    #[error("用户不存在: {0}")]
    UserNotFound(String),

    #[error("对象不存在: {0}")]
    ObjectNotFound(String),

    #[error("徽章不存在: {0}")]
    BadgeNotFound(i64),

    #[error("无法识别的对象 ID: {0}")]
    InvalidObjectId(String),

    #[error("未知的操作: {0}")]
    UnknownAction(String),

    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Infrastructure(#[from] AnswerError),

    #[error("内部错误: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(_) => true,
            Self::Infrastructure(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ObjectNotFound(_)
                | Self::BadgeNotFound(_)
                | Self::InvalidObjectId(_)
                | Self::UnknownAction(_)
                | Self::Validation(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::ObjectNotFound(_) => "OBJECT_NOT_FOUND",
            Self::BadgeNotFound(_) => "BADGE_NOT_FOUND",
            Self::InvalidObjectId(_) => "INVALID_OBJECT_ID",
            Self::UnknownAction(_) => "UNKNOWN_ACTION",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Infrastructure(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// API 响应中的 reason 键
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "user.not_found",
            Self::ObjectNotFound(_) | Self::InvalidObjectId(_) => "base.object_not_found",
            Self::BadgeNotFound(_) => "badge.object_not_found",
            Self::UnknownAction(_) | Self::Validation(_) => "base.request_format_error",
            _ => "base.unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors() {
        let cases: Vec<(ServiceError, &str, &str)> = vec![
            (
                ServiceError::UserNotFound("u1".into()),
                "USER_NOT_FOUND",
                "user.not_found",
            ),
            (
                ServiceError::ObjectNotFound("10010000000000001".into()),
                "OBJECT_NOT_FOUND",
                "base.object_not_found",
            ),
            (
                ServiceError::InvalidObjectId("abc".into()),
                "INVALID_OBJECT_ID",
                "base.object_not_found",
            ),
            (
                ServiceError::BadgeNotFound(3),
                "BADGE_NOT_FOUND",
                "badge.object_not_found",
            ),
            (
                ServiceError::UnknownAction("question.fly".into()),
                "UNKNOWN_ACTION",
                "base.request_format_error",
            ),
        ];

        for (err, code, reason) in cases {
            assert!(err.is_business_error(), "{err}");
            assert!(!err.is_retryable(), "{err}");
            assert_eq!(err.error_code(), code);
            assert_eq!(err.reason(), reason);
        }
    }

    #[test]
    fn test_system_errors() {
        let err = ServiceError::Database(sqlx::Error::PoolTimedOut);
        assert!(err.is_retryable());
        assert!(!err.is_business_error());
        assert_eq!(err.reason(), "base.unknown");

        let err = ServiceError::from(AnswerError::QueueClosed);
        assert!(!err.is_business_error());
        assert_eq!(err.error_code(), AnswerError::QueueClosed.code());

        let err = ServiceError::Internal("boom".into());
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert_eq!(err.reason(), "base.unknown");
    }
}
