//! 领域事件模型与处理器抽象
//!
//! 定义问答站点内所有领域事件的消息格式，以及 `EventHandler` trait。
//! 事件由请求路径上的业务操作产生，经进程内事件队列异步分发给徽章、通知等消费者。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// EventType: 事件类型枚举
// ---------------------------------------------------------------------------

/// 事件类型枚举
///
/// 按内容对象划分：问题、回答、评论、投票、举报。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "question.create")]
    QuestionCreate,
    #[serde(rename = "question.update")]
    QuestionUpdate,
    #[serde(rename = "question.delete")]
    QuestionDelete,
    #[serde(rename = "question.close")]
    QuestionClose,
    #[serde(rename = "question.reopen")]
    QuestionReopen,
    #[serde(rename = "question.pin")]
    QuestionPin,
    #[serde(rename = "question.unpin")]
    QuestionUnpin,

    #[serde(rename = "answer.create")]
    AnswerCreate,
    #[serde(rename = "answer.update")]
    AnswerUpdate,
    #[serde(rename = "answer.delete")]
    AnswerDelete,
    #[serde(rename = "answer.accept")]
    AnswerAccept,

    #[serde(rename = "comment.create")]
    CommentCreate,
    #[serde(rename = "comment.update")]
    CommentUpdate,
    #[serde(rename = "comment.delete")]
    CommentDelete,

    #[serde(rename = "vote.up")]
    VoteUp,
    #[serde(rename = "vote.down")]
    VoteDown,

    #[serde(rename = "report.create")]
    ReportCreate,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuestionCreate => "question.create",
            Self::QuestionUpdate => "question.update",
            Self::QuestionDelete => "question.delete",
            Self::QuestionClose => "question.close",
            Self::QuestionReopen => "question.reopen",
            Self::QuestionPin => "question.pin",
            Self::QuestionUnpin => "question.unpin",
            Self::AnswerCreate => "answer.create",
            Self::AnswerUpdate => "answer.update",
            Self::AnswerDelete => "answer.delete",
            Self::AnswerAccept => "answer.accept",
            Self::CommentCreate => "comment.create",
            Self::CommentUpdate => "comment.update",
            Self::CommentDelete => "comment.delete",
            Self::VoteUp => "vote.up",
            Self::VoteDown => "vote.down",
            Self::ReportCreate => "report.create",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EventMsg: 事件消息
// ---------------------------------------------------------------------------

/// 领域事件消息
///
/// `user_id` 是执行操作的用户；问题/回答/评论的 ID 及其作者 ID 按事件类型选填，
/// 由产生事件的业务操作在入队前补齐，消费者无需再回查归属关系。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMsg {
    pub event_type: EventType,
    pub user_id: String,
    pub question_id: Option<String>,
    pub question_user_id: Option<String>,
    pub answer_id: Option<String>,
    pub answer_user_id: Option<String>,
    pub comment_id: Option<String>,
    pub comment_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EventMsg {
    pub fn new(event_type: EventType, user_id: impl Into<String>) -> Self {
        Self {
            event_type,
            user_id: user_id.into(),
            question_id: None,
            question_user_id: None,
            answer_id: None,
            answer_user_id: None,
            comment_id: None,
            comment_user_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_question(mut self, question_id: impl Into<String>, user_id: Option<String>) -> Self {
        self.question_id = Some(question_id.into());
        self.question_user_id = user_id;
        self
    }

    pub fn with_answer(mut self, answer_id: impl Into<String>, user_id: Option<String>) -> Self {
        self.answer_id = Some(answer_id.into());
        self.answer_user_id = user_id;
        self
    }

    pub fn with_comment(mut self, comment_id: impl Into<String>, user_id: Option<String>) -> Self {
        self.comment_id = Some(comment_id.into());
        self.comment_user_id = user_id;
        self
    }

    /// 事件直接作用的对象 ID：评论 > 回答 > 问题
    pub fn target_object_id(&self) -> Option<&str> {
        self.comment_id
            .as_deref()
            .or(self.answer_id.as_deref())
            .or(self.question_id.as_deref())
    }

    /// 事件直接作用的对象作者
    pub fn target_object_user_id(&self) -> Option<&str> {
        if self.comment_id.is_some() {
            self.comment_user_id.as_deref()
        } else if self.answer_id.is_some() {
            self.answer_user_id.as_deref()
        } else {
            self.question_user_id.as_deref()
        }
    }
}

// ---------------------------------------------------------------------------
// EventHandler: 事件处理器抽象
// ---------------------------------------------------------------------------

/// 事件处理器
///
/// 队列 worker 按注册顺序调用所有 `supports` 返回 true 的处理器，
/// 处理器可以并发安全地被共享（`Send + Sync`）。
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理器名称，用于日志和指标标签
    fn name(&self) -> &'static str;

    /// 是否关心该事件类型
    fn supports(&self, event_type: &EventType) -> bool;

    /// 处理单条事件
    async fn handle(&self, event: &EventMsg) -> Result<()>;
}
