//! 受等级控制的操作

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::models::ObjectType;

/// 配置键前缀，完整键为 `rank.<action>`
const CONFIG_KEY_PREFIX: &str = "rank.";

macro_rules! actions {
    ($($variant:ident => $name:literal,)+) => {
        /// 受等级控制的操作
        ///
        /// 字符串形式与站点配置 `rank.<action>` 的后缀一致
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Action {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl Action {
            pub const ALL: &'static [Action] = &[$(Action::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl FromStr for Action {
            type Err = ServiceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(ServiceError::UnknownAction(s.to_string())),
                }
            }
        }
    };
}

actions! {
    QuestionAdd => "question.add",
    QuestionEdit => "question.edit",
    QuestionEditWithoutReview => "question.edit_without_review",
    QuestionDelete => "question.delete",
    QuestionClose => "question.close",
    QuestionReopen => "question.reopen",
    QuestionPin => "question.pin",
    QuestionUnpin => "question.unpin",
    QuestionVoteUp => "question.vote_up",
    QuestionVoteDown => "question.vote_down",
    AnswerAdd => "answer.add",
    AnswerEdit => "answer.edit",
    AnswerEditWithoutReview => "answer.edit_without_review",
    AnswerDelete => "answer.delete",
    AnswerAccept => "answer.accept",
    AnswerVoteUp => "answer.vote_up",
    AnswerVoteDown => "answer.vote_down",
    CommentAdd => "comment.add",
    CommentEdit => "comment.edit",
    CommentDelete => "comment.delete",
    CommentVoteUp => "comment.vote_up",
    CommentVoteDown => "comment.vote_down",
    ReportAdd => "report.add",
    TagAdd => "tag.add",
    TagEdit => "tag.edit",
    TagDelete => "tag.delete",
    TagSynonym => "tag.synonym",
    LinkUrlLimit => "link.url_limit",
    VoteDetail => "vote.detail",
}

impl Action {
    /// 站点配置中的阈值键
    pub fn config_key(&self) -> String {
        format!("{CONFIG_KEY_PREFIX}{}", self.as_str())
    }

    /// 对象对应的投票操作；标签和用户不可投票
    pub fn vote_for(object_type: ObjectType, up: bool) -> Option<Self> {
        let action = match (object_type, up) {
            (ObjectType::Question, true) => Self::QuestionVoteUp,
            (ObjectType::Question, false) => Self::QuestionVoteDown,
            (ObjectType::Answer, true) => Self::AnswerVoteUp,
            (ObjectType::Answer, false) => Self::AnswerVoteDown,
            (ObjectType::Comment, true) => Self::CommentVoteUp,
            (ObjectType::Comment, false) => Self::CommentVoteDown,
            (ObjectType::Tag | ObjectType::User, _) => return None,
        };
        Some(action)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_actions() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), *action);
            let json = serde_json::to_string(action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn test_config_key() {
        assert_eq!(Action::QuestionEdit.config_key(), "rank.question.edit");
        assert_eq!(Action::AnswerDelete.config_key(), "rank.answer.delete");
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = "question.fly".parse::<Action>().unwrap_err();
        assert!(matches!(err, ServiceError::UnknownAction(s) if s == "question.fly"));
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn test_vote_for() {
        assert_eq!(
            Action::vote_for(ObjectType::Answer, true),
            Some(Action::AnswerVoteUp)
        );
        assert_eq!(
            Action::vote_for(ObjectType::Comment, false),
            Some(Action::CommentVoteDown)
        );
        assert_eq!(Action::vote_for(ObjectType::Tag, true), None);
    }
}
