//! 站内通知
//!
//! 订阅回答、评论、采纳事件，给被作用内容的作者写一条通知。操作者本人不会收到自己触发的通知。

use std::sync::Arc;

use answer_shared::error::{AnswerError, Result as SharedResult};
use answer_shared::events::{EventHandler, EventMsg, EventType};
use async_trait::async_trait;
use tracing::debug;

use crate::models::{NewNotification, NotificationType};
use crate::repository::NotificationRepositoryTrait;

const HANDLER_NAME: &str = "notification";

pub struct NotificationEventHandler {
    repo: Arc<dyn NotificationRepositoryTrait>,
}

impl NotificationEventHandler {
    pub fn new(repo: Arc<dyn NotificationRepositoryTrait>) -> Self {
        Self { repo }
    }

    /// 根据事件计算通知，无需通知时返回 None
    pub fn build(event: &EventMsg) -> Option<NewNotification> {
        let (receiver, object_id, notification_type) = match event.event_type {
            EventType::AnswerCreate => (
                event.question_user_id.as_deref()?,
                event.answer_id.as_deref()?,
                NotificationType::AnswerTheQuestion,
            ),
            EventType::CommentCreate => {
                // 评论回答时通知回答作者，否则通知问题作者
                let receiver = if event.answer_id.is_some() {
                    event.answer_user_id.as_deref()?
                } else {
                    event.question_user_id.as_deref()?
                };
                (
                    receiver,
                    event.comment_id.as_deref()?,
                    NotificationType::CommentTheObject,
                )
            }
            EventType::AnswerAccept => (
                event.answer_user_id.as_deref()?,
                event.answer_id.as_deref()?,
                NotificationType::AcceptAnswer,
            ),
            _ => return None,
        };

        if receiver.is_empty() || receiver == event.user_id {
            return None;
        }

        Some(NewNotification {
            user_id: receiver.to_string(),
            trigger_user_id: event.user_id.clone(),
            object_id: object_id.to_string(),
            notification_type,
        })
    }
}

#[async_trait]
impl EventHandler for NotificationEventHandler {
    fn name(&self) -> &'static str {
        HANDLER_NAME
    }

    fn supports(&self, event_type: &EventType) -> bool {
        matches!(
            event_type,
            EventType::AnswerCreate | EventType::CommentCreate | EventType::AnswerAccept
        )
    }

    async fn handle(&self, event: &EventMsg) -> SharedResult<()> {
        let Some(notification) = Self::build(event) else {
            return Ok(());
        };

        let id = self
            .repo
            .add_notification(&notification)
            .await
            .map_err(|e| AnswerError::handler(HANDLER_NAME, e))?;

        debug!(
            id,
            user_id = %notification.user_id,
            notification_type = ?notification.notification_type,
            "通知已写入"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::repository::MockNotificationRepositoryTrait;

    const QUESTION_ID: &str = "10010000000000001";
    const ANSWER_ID: &str = "10020000000000001";
    const COMMENT_ID: &str = "10050000000000001";

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_answer_notifies_question_author() {
        let event = EventMsg::new(EventType::AnswerCreate, "bob")
            .with_question(QUESTION_ID, some("alice"))
            .with_answer(ANSWER_ID, some("bob"));

        assert_eq!(
            NotificationEventHandler::build(&event),
            Some(NewNotification {
                user_id: "alice".to_string(),
                trigger_user_id: "bob".to_string(),
                object_id: ANSWER_ID.to_string(),
                notification_type: NotificationType::AnswerTheQuestion,
            })
        );
    }

    #[test]
    fn test_comment_receiver() {
        let on_question = EventMsg::new(EventType::CommentCreate, "carol")
            .with_question(QUESTION_ID, some("alice"))
            .with_comment(COMMENT_ID, some("carol"));
        let n = NotificationEventHandler::build(&on_question).unwrap();
        assert_eq!(n.user_id, "alice");
        assert_eq!(n.notification_type, NotificationType::CommentTheObject);

        let on_answer = on_question.clone().with_answer(ANSWER_ID, some("bob"));
        let n = NotificationEventHandler::build(&on_answer).unwrap();
        assert_eq!(n.user_id, "bob");
        assert_eq!(n.object_id, COMMENT_ID);
    }

    #[test]
    fn test_accept_notifies_answer_author() {
        let event = EventMsg::new(EventType::AnswerAccept, "alice")
            .with_question(QUESTION_ID, some("alice"))
            .with_answer(ANSWER_ID, some("bob"));
        let n = NotificationEventHandler::build(&event).unwrap();
        assert_eq!(n.user_id, "bob");
        assert_eq!(n.notification_type, NotificationType::AcceptAnswer);
    }

    #[test]
    fn test_no_self_notification() {
        let event = EventMsg::new(EventType::AnswerCreate, "alice")
            .with_question(QUESTION_ID, some("alice"))
            .with_answer(ANSWER_ID, some("alice"));
        assert_eq!(NotificationEventHandler::build(&event), None);
    }

    #[test]
    fn test_incomplete_or_unrelated_events() {
        let missing_author =
            EventMsg::new(EventType::AnswerCreate, "bob").with_answer(ANSWER_ID, some("bob"));
        assert_eq!(NotificationEventHandler::build(&missing_author), None);

        let vote = EventMsg::new(EventType::VoteUp, "bob").with_question(QUESTION_ID, some("alice"));
        assert_eq!(NotificationEventHandler::build(&vote), None);
    }

    #[tokio::test]
    async fn test_handle_writes_notification() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_add_notification()
            .withf(|n| n.user_id == "alice" && n.trigger_user_id == "bob")
            .times(1)
            .returning(|_| Ok(7));

        let handler = NotificationEventHandler::new(Arc::new(repo));
        let event = EventMsg::new(EventType::AnswerCreate, "bob")
            .with_question(QUESTION_ID, some("alice"))
            .with_answer(ANSWER_ID, some("bob"));

        handler.handle(&event).await.unwrap();
    }

    #[tokio::test]
    async fn test_handle_skips_repository_when_nothing_to_send() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_add_notification().never();

        let handler = NotificationEventHandler::new(Arc::new(repo));
        let event = EventMsg::new(EventType::AnswerAccept, "bob")
            .with_question(QUESTION_ID, some("bob"))
            .with_answer(ANSWER_ID, some("bob"));
        handler.handle(&event).await.unwrap();
    }

    #[tokio::test]
    async fn test_repository_error_is_reported() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_add_notification()
            .returning(|_| Err(ServiceError::Database(sqlx::Error::PoolClosed)));

        let handler = NotificationEventHandler::new(Arc::new(repo));
        let event = EventMsg::new(EventType::AnswerCreate, "bob")
            .with_question(QUESTION_ID, some("alice"))
            .with_answer(ANSWER_ID, some("bob"));

        assert!(matches!(
            handler.handle(&event).await,
            Err(AnswerError::Handler { .. })
        ));
    }
}
