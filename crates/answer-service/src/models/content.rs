//! 内容状态与写入参数

use serde::{Deserialize, Serialize};

use super::ObjectType;

/// 问题状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum QuestionStatus {
    #[default]
    Open,
    Closed,
    Deleted,
}

/// 投票结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResult {
    /// 对象当前的净票数
    pub vote_count: i64,
    /// 本次操作后用户对该对象的投票（1 赞成，-1 反对，0 已撤销）
    pub user_vote: i16,
}

/// 新问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub user_id: String,
    pub title: String,
    pub content: String,
}

/// 新回答，写入时同时累加问题的回答数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: String,
    pub user_id: String,
    pub content: String,
}

/// 新评论
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub user_id: String,
    /// 被评论的问题或回答
    pub object_id: String,
    pub question_id: String,
    pub content: String,
}

/// 举报
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub user_id: String,
    pub object_id: String,
    pub object_type: ObjectType,
    pub reason: String,
}
