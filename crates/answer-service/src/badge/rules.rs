//! 徽章规则
//!
//! 每个徽章的 `handler` 字段指向一条规则。事件到达时先按事件类型找出可能触发的规则，
//! 再加载挂在这些规则上的启用徽章，逐个判断是否满足并生成待授予记录。

use std::str::FromStr;
use std::sync::Arc;

use answer_shared::events::{EventMsg, EventType};
use tracing::{debug, warn};

use crate::error::{Result, ServiceError};
use crate::models::{Badge, NewBadgeAward};
use crate::repository::{BadgeRepositoryTrait, BadgeRuleRepositoryTrait};

/// 规则处理器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeHandler {
    /// 首次提问或回答
    FirstPost,
    /// 首次编辑问题或回答
    FirstPostEdit,
    /// 首次举报
    FirstFlaggedPost,
    /// 首次投赞成票
    FirstUpVote,
    /// 首次采纳回答
    FirstAcceptAnswer,
    /// 问题得票达到 `param.amount`
    ReachQuestionVote,
    /// 回答得票达到 `param.amount`
    ReachAnswerVote,
    /// 被采纳的回答数达到 `param.amount`
    ReachAnswerAcceptedAmount,
}

impl BadgeHandler {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstPost => "FirstPost",
            Self::FirstPostEdit => "FirstPostEdit",
            Self::FirstFlaggedPost => "FirstFlaggedPost",
            Self::FirstUpVote => "FirstUpVote",
            Self::FirstAcceptAnswer => "FirstAcceptAnswer",
            Self::ReachQuestionVote => "ReachQuestionVote",
            Self::ReachAnswerVote => "ReachAnswerVote",
            Self::ReachAnswerAcceptedAmount => "ReachAnswerAcceptedAmount",
        }
    }

    /// 事件类型可能触发的规则
    pub fn for_event(event_type: EventType) -> &'static [BadgeHandler] {
        match event_type {
            EventType::QuestionCreate | EventType::AnswerCreate => &[Self::FirstPost],
            EventType::QuestionUpdate | EventType::AnswerUpdate => &[Self::FirstPostEdit],
            EventType::ReportCreate => &[Self::FirstFlaggedPost],
            EventType::VoteUp => &[
                Self::FirstUpVote,
                Self::ReachQuestionVote,
                Self::ReachAnswerVote,
            ],
            EventType::AnswerAccept => &[Self::FirstAcceptAnswer, Self::ReachAnswerAcceptedAmount],
            _ => &[],
        }
    }
}

impl FromStr for BadgeHandler {
    type Err = ServiceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "FirstPost" => Ok(Self::FirstPost),
            "FirstPostEdit" => Ok(Self::FirstPostEdit),
            "FirstFlaggedPost" => Ok(Self::FirstFlaggedPost),
            "FirstUpVote" => Ok(Self::FirstUpVote),
            "FirstAcceptAnswer" => Ok(Self::FirstAcceptAnswer),
            "ReachQuestionVote" => Ok(Self::ReachQuestionVote),
            "ReachAnswerVote" => Ok(Self::ReachAnswerVote),
            "ReachAnswerAcceptedAmount" => Ok(Self::ReachAnswerAcceptedAmount),
            _ => Err(ServiceError::Validation(format!("未知的徽章规则: {s}"))),
        }
    }
}

impl std::fmt::Display for BadgeHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 规则评估器
pub struct BadgeRuleEvaluator {
    badge_repo: Arc<dyn BadgeRepositoryTrait>,
    rule_repo: Arc<dyn BadgeRuleRepositoryTrait>,
}

impl BadgeRuleEvaluator {
    pub fn new(
        badge_repo: Arc<dyn BadgeRepositoryTrait>,
        rule_repo: Arc<dyn BadgeRuleRepositoryTrait>,
    ) -> Self {
        Self {
            badge_repo,
            rule_repo,
        }
    }

    /// 评估事件，返回待授予记录
    ///
    /// 只负责判断条件，是否重复授予由 `BadgeAwardService` 处理。
    pub async fn evaluate(&self, event: &EventMsg) -> Result<Vec<NewBadgeAward>> {
        let handlers = BadgeHandler::for_event(event.event_type);
        if handlers.is_empty() {
            return Ok(vec![]);
        }

        let names: Vec<String> = handlers.iter().map(|h| h.as_str().to_string()).collect();
        let badges = self.badge_repo.list_active_by_handlers(&names).await?;

        let mut awards = Vec::new();
        for badge in &badges {
            let handler = match badge.handler.parse::<BadgeHandler>() {
                Ok(h) => h,
                Err(_) => {
                    warn!(badge_id = badge.id, handler = %badge.handler, "徽章挂载了未知规则，跳过");
                    continue;
                }
            };

            if let Some(award) = self.evaluate_badge(handler, badge, event).await? {
                awards.push(award);
            }
        }

        debug!(
            event_type = %event.event_type,
            candidates = badges.len(),
            matched = awards.len(),
            "徽章规则评估完成"
        );
        Ok(awards)
    }

    async fn evaluate_badge(
        &self,
        handler: BadgeHandler,
        badge: &Badge,
        event: &EventMsg,
    ) -> Result<Option<NewBadgeAward>> {
        match handler {
            BadgeHandler::FirstPost
            | BadgeHandler::FirstPostEdit
            | BadgeHandler::FirstFlaggedPost
            | BadgeHandler::FirstUpVote
            | BadgeHandler::FirstAcceptAnswer => {
                if event.user_id.is_empty() {
                    return Ok(None);
                }
                let key = event.target_object_id().unwrap_or_default();
                Ok(Some(NewBadgeAward::new(badge.id, event.user_id.as_str(), key)))
            }
            BadgeHandler::ReachQuestionVote => {
                if event.answer_id.is_some() || event.comment_id.is_some() {
                    return Ok(None);
                }
                let (Some(question_id), Some(owner)) =
                    (event.question_id.as_deref(), event.question_user_id.as_deref())
                else {
                    return Ok(None);
                };
                let Some(amount) = threshold(badge) else {
                    return Ok(None);
                };
                let votes = self.rule_repo.object_vote_count(question_id).await?;
                Ok((votes >= amount).then(|| NewBadgeAward::new(badge.id, owner, question_id)))
            }
            BadgeHandler::ReachAnswerVote => {
                if event.comment_id.is_some() {
                    return Ok(None);
                }
                let (Some(answer_id), Some(owner)) =
                    (event.answer_id.as_deref(), event.answer_user_id.as_deref())
                else {
                    return Ok(None);
                };
                let Some(amount) = threshold(badge) else {
                    return Ok(None);
                };
                let votes = self.rule_repo.object_vote_count(answer_id).await?;
                Ok((votes >= amount).then(|| NewBadgeAward::new(badge.id, owner, answer_id)))
            }
            BadgeHandler::ReachAnswerAcceptedAmount => {
                let (Some(answer_id), Some(owner)) =
                    (event.answer_id.as_deref(), event.answer_user_id.as_deref())
                else {
                    return Ok(None);
                };
                let Some(amount) = threshold(badge) else {
                    return Ok(None);
                };
                let accepted = self.rule_repo.accepted_answer_count(owner).await?;
                Ok((accepted >= amount).then(|| NewBadgeAward::new(badge.id, owner, answer_id)))
            }
        }
    }
}

fn threshold(badge: &Badge) -> Option<i64> {
    let amount = badge.param_amount();
    if amount.is_none() {
        warn!(badge_id = badge.id, param = %badge.param, "阈值类徽章缺少 amount 参数");
    }
    amount
}
