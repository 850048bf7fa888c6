//! 站内通知

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum NotificationType {
    /// 问题收到新回答
    AnswerTheQuestion,
    /// 问题或回答收到新评论
    CommentTheObject,
    /// 回答被采纳
    AcceptAnswer,
    /// 获得徽章
    BadgeAward,
}

/// 通知记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    /// 接收者
    pub user_id: String,
    /// 触发者
    pub trigger_user_id: String,
    pub object_id: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// 待写入的通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: String,
    pub trigger_user_id: String,
    pub object_id: String,
    pub notification_type: NotificationType,
}
