//! 统一错误处理模块
//!
//! 定义基础设施层共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 基础设施错误类型
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis 错误: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("事件队列已关闭")]
    QueueClosed,

    #[error("事件处理失败: {handler} - {message}")]
    Handler { handler: String, message: String },

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, AnswerError>;

impl AnswerError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Redis(_) => "REDIS_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::QueueClosed => "QUEUE_CLOSED",
            Self::Handler { .. } => "HANDLER_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Redis(_))
    }

    /// 构造事件处理器错误
    pub fn handler(handler: impl Into<String>, message: impl ToString) -> Self {
        Self::Handler {
            handler: handler.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(AnswerError::QueueClosed.code(), "QUEUE_CLOSED");
        assert_eq!(
            AnswerError::handler("badge", "boom").code(),
            "HANDLER_ERROR"
        );
    }

    #[test]
    fn test_is_retryable() {
        let db_err = AnswerError::Database(sqlx::Error::PoolTimedOut);
        assert!(db_err.is_retryable());
        assert!(!AnswerError::QueueClosed.is_retryable());
    }

    #[test]
    fn test_handler_error_display_contains_context() {
        let err = AnswerError::handler("notification", "user missing");
        let msg = err.to_string();
        assert!(msg.contains("notification"));
        assert!(msg.contains("user missing"));
    }
}
