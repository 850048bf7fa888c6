//! HTTP 请求处理器
//!
//! 写操作统一流程：校验对象类型 -> 等级权限判定 -> 执行 -> 投递领域事件。

pub mod badge;
pub mod content;
pub mod permission;
pub mod post;
pub mod report;
pub mod search;
pub mod vote;

use answer_service::{Action, ObjectInfo, ObjectType};
use answer_shared::events::{EventMsg, EventType};
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 要求用户可以对对象执行操作，否则返回声望不足
pub(crate) async fn ensure_permission(
    state: &AppState,
    user_id: &str,
    action: Action,
    object_id: &str,
) -> Result<()> {
    let checks = state
        .rank_service
        .check_operation_permissions_for_ranks(user_id, &[action], object_id)
        .await?;

    match checks.first() {
        Some(check) if check.allowed => Ok(()),
        Some(check) => Err(ApiError::RankNotMet {
            required: check.required_rank,
        }),
        None => Err(ApiError::Internal(format!("{action} 没有判定结果"))),
    }
}

/// 按 ID 加载指定类型的对象，类型不符视为不存在
pub(crate) async fn load_object(
    state: &AppState,
    object_id: &str,
    expected: ObjectType,
) -> Result<ObjectInfo> {
    if ObjectType::from_object_id(object_id) != Some(expected) {
        return Err(ApiError::NotFound(format!("{object_id} 不是{expected}")));
    }
    Ok(state.object_repo.get_info(object_id).await?)
}

/// 投递领域事件，不等待处理结果
pub(crate) async fn publish(state: &AppState, event: EventMsg) {
    let event_type = event.event_type;
    if !state.events.send(event).await {
        warn!(event_type = %event_type, "领域事件未能入队");
    }
}

/// 以对象为目标构造事件，带上对象作者和所属问题；标签和用户返回 None
pub(crate) fn object_event(
    event_type: EventType,
    user_id: &str,
    object: ObjectInfo,
) -> Option<EventMsg> {
    let owner = Some(object.object_creator_user_id);
    let event = EventMsg::new(event_type, user_id);

    let event = match object.object_type {
        ObjectType::Question => event.with_question(object.object_id, owner),
        ObjectType::Answer => {
            let event = match object.question_id {
                Some(question_id) => event.with_question(question_id, None),
                None => event,
            };
            event.with_answer(object.object_id, owner)
        }
        ObjectType::Comment => {
            let event = match object.question_id {
                Some(question_id) => event.with_question(question_id, None),
                None => event,
            };
            event.with_comment(object.object_id, owner)
        }
        ObjectType::Tag | ObjectType::User => return None,
    };
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_event_targets_object() {
        let mut answer = ObjectInfo::new("10020000000000001", ObjectType::Answer, "author");
        answer.question_id = Some("10010000000000001".to_string());

        let event = object_event(EventType::VoteUp, "voter", answer).unwrap();
        assert_eq!(event.target_object_id(), Some("10020000000000001"));
        assert_eq!(event.target_object_user_id(), Some("author"));
        assert_eq!(event.question_id.as_deref(), Some("10010000000000001"));

        let question = ObjectInfo::new("10010000000000001", ObjectType::Question, "asker");
        let event = object_event(EventType::ReportCreate, "reporter", question).unwrap();
        assert_eq!(event.target_object_user_id(), Some("asker"));
        assert!(event.answer_id.is_none());

        let tag = ObjectInfo::new("10030000000000001", ObjectType::Tag, "");
        assert!(object_event(EventType::VoteUp, "voter", tag).is_none());
    }
}
