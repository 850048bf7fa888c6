//! 徽章事件处理器

use std::sync::Arc;

use answer_shared::error::{AnswerError, Result as SharedResult};
use answer_shared::events::{EventHandler, EventMsg, EventType};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{BadgeAwardService, BadgeHandler, BadgeRuleEvaluator};
use crate::models::{NewNotification, NotificationType};
use crate::repository::NotificationRepositoryTrait;

const HANDLER_NAME: &str = "badge";

/// 评估规则并授予徽章
///
/// 单条授予失败只记录日志，不影响同一事件的其余授予。
pub struct BadgeEventHandler {
    evaluator: BadgeRuleEvaluator,
    award_service: Arc<BadgeAwardService>,
    notification_repo: Option<Arc<dyn NotificationRepositoryTrait>>,
}

impl BadgeEventHandler {
    pub fn new(evaluator: BadgeRuleEvaluator, award_service: Arc<BadgeAwardService>) -> Self {
        Self {
            evaluator,
            award_service,
            notification_repo: None,
        }
    }

    /// 授予成功后给获得者发站内通知
    pub fn with_notifications(mut self, repo: Arc<dyn NotificationRepositoryTrait>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    async fn notify(&self, event: &EventMsg, user_id: &str, award_key: &str) {
        let Some(repo) = &self.notification_repo else {
            return;
        };

        let notification = NewNotification {
            user_id: user_id.to_string(),
            trigger_user_id: event.user_id.clone(),
            object_id: award_key.to_string(),
            notification_type: NotificationType::BadgeAward,
        };
        if let Err(e) = repo.add_notification(&notification).await {
            warn!(user_id, error = %e, "徽章通知写入失败");
        }
    }
}

#[async_trait]
impl EventHandler for BadgeEventHandler {
    fn name(&self) -> &'static str {
        HANDLER_NAME
    }

    fn supports(&self, event_type: &EventType) -> bool {
        !BadgeHandler::for_event(*event_type).is_empty()
    }

    async fn handle(&self, event: &EventMsg) -> SharedResult<()> {
        let proposals = self
            .evaluator
            .evaluate(event)
            .await
            .map_err(|e| AnswerError::handler(HANDLER_NAME, e))?;

        for proposal in &proposals {
            match self
                .award_service
                .award(proposal.badge_id, &proposal.user_id, &proposal.award_key, false)
                .await
            {
                Ok(true) => {
                    self.notify(event, &proposal.user_id, &proposal.award_key)
                        .await
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        badge_id = proposal.badge_id,
                        user_id = %proposal.user_id,
                        event_type = %event.event_type,
                        error = %e,
                        "徽章授予失败"
                    );
                }
            }
        }

        debug!(event_type = %event.event_type, proposals = proposals.len(), "徽章事件处理完成");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::award_service::tests::{InMemoryAwards, badge_repo};
    use crate::error::ServiceError;
    use crate::models::fixtures::badge;
    use crate::models::{Badge, BadgeAwardType};
    use crate::repository::{
        MockBadgeRepositoryTrait, MockBadgeRuleRepositoryTrait, MockNotificationRepositoryTrait,
    };
    use serde_json::json;

    fn catalog() -> Vec<Badge> {
        vec![
            badge(1, "FirstPost", BadgeAwardType::Single, json!({})),
            badge(2, "FirstUpVote", BadgeAwardType::Single, json!({})),
        ]
    }

    fn handler_with(
        list_repo: MockBadgeRepositoryTrait,
        awards: Arc<InMemoryAwards>,
    ) -> BadgeEventHandler {
        let evaluator = BadgeRuleEvaluator::new(
            Arc::new(list_repo),
            Arc::new(MockBadgeRuleRepositoryTrait::new()),
        );
        let award_service = Arc::new(BadgeAwardService::new(Arc::new(badge_repo(catalog())), awards));
        BadgeEventHandler::new(evaluator, award_service)
    }

    fn listing(list: Vec<Badge>) -> MockBadgeRepositoryTrait {
        let mut mock = MockBadgeRepositoryTrait::new();
        mock.expect_list_active_by_handlers().returning(move |handlers| {
            Ok(list
                .iter()
                .filter(|b| handlers.contains(&b.handler))
                .cloned()
                .collect())
        });
        mock
    }

    #[test]
    fn test_supports() {
        let handler = handler_with(MockBadgeRepositoryTrait::new(), Arc::default());
        assert!(handler.supports(&EventType::QuestionCreate));
        assert!(handler.supports(&EventType::AnswerAccept));
        assert!(!handler.supports(&EventType::VoteDown));
        assert!(!handler.supports(&EventType::CommentCreate));
    }

    #[tokio::test]
    async fn test_repeated_event_awards_single_badge_once() {
        let awards = Arc::new(InMemoryAwards::default());
        let handler = handler_with(listing(catalog()), awards.clone());

        let event = EventMsg::new(EventType::AnswerCreate, "u1")
            .with_question("10010000000000001", Some("u2".to_string()))
            .with_answer("10020000000000001", Some("u1".to_string()));

        handler.handle(&event).await.unwrap();
        handler.handle(&event).await.unwrap();

        assert_eq!(awards.count(), 1);
    }

    #[tokio::test]
    async fn test_award_failure_does_not_stop_others() {
        // 404 号徽章在授予时查不到，授予失败；2 号不受影响
        let list = vec![
            badge(404, "FirstUpVote", BadgeAwardType::Single, json!({})),
            badge(2, "FirstUpVote", BadgeAwardType::Single, json!({})),
        ];

        let awards = Arc::new(InMemoryAwards::default());
        let handler = handler_with(listing(list), awards.clone());

        let event = EventMsg::new(EventType::VoteUp, "voter")
            .with_question("10010000000000001", Some("asker".to_string()));

        handler.handle(&event).await.unwrap();
        assert_eq!(awards.count(), 1);
        assert_eq!(awards.awards.lock().unwrap()[0].badge_id, 2);
    }

    #[tokio::test]
    async fn test_evaluation_error_maps_to_handler_error() {
        let mut list_repo = MockBadgeRepositoryTrait::new();
        list_repo
            .expect_list_active_by_handlers()
            .returning(|_| Err(ServiceError::Database(sqlx::Error::PoolTimedOut)));

        let handler = handler_with(list_repo, Arc::default());
        let err = handler
            .handle(&EventMsg::new(EventType::QuestionCreate, "u1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AnswerError::Handler { ref handler, .. } if handler == "badge"));
    }

    #[tokio::test]
    async fn test_awardee_notified() {
        let mut notifications = MockNotificationRepositoryTrait::new();
        notifications
            .expect_add_notification()
            .withf(|n| {
                n.user_id == "u1"
                    && n.notification_type == NotificationType::BadgeAward
                    && n.object_id == "10010000000000001"
            })
            .times(1)
            .returning(|_| Ok(1));

        let handler = handler_with(listing(catalog()), Arc::default())
            .with_notifications(Arc::new(notifications));

        let event = EventMsg::new(EventType::QuestionCreate, "u1")
            .with_question("10010000000000001", Some("u1".to_string()));
        handler.handle(&event).await.unwrap();
        // 第二次不再授予，也不再通知
        handler.handle(&event).await.unwrap();
    }
}
