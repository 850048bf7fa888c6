//! 徽章授予服务
//!
//! 授予流程：
//! 1. 徽章存在且启用
//! 2. 重复检查：`Single` 按 (用户, 徽章)，`Multiple` 按 (用户, 徽章, award_key)，`force` 跳过后者
//! 3. 写入授予记录并累加徽章的授予次数，两者在仓储内同一事务完成
//!
//! 事件 worker 是唯一的调用方且串行处理，检查与写入之间不加锁。

use std::sync::Arc;

use answer_shared::observability::metrics::record_badge_award;
use tracing::{debug, info, instrument};

use crate::error::{Result, ServiceError};
use crate::models::{Badge, BadgeAward, BadgeAwardType, NewBadgeAward};
use crate::repository::{BadgeAwardRepositoryTrait, BadgeRepositoryTrait};

pub struct BadgeAwardService {
    badge_repo: Arc<dyn BadgeRepositoryTrait>,
    award_repo: Arc<dyn BadgeAwardRepositoryTrait>,
}

impl BadgeAwardService {
    pub fn new(
        badge_repo: Arc<dyn BadgeRepositoryTrait>,
        award_repo: Arc<dyn BadgeAwardRepositoryTrait>,
    ) -> Self {
        Self {
            badge_repo,
            award_repo,
        }
    }

    /// 授予徽章，返回是否实际写入了记录
    #[instrument(skip(self))]
    pub async fn award(
        &self,
        badge_id: i64,
        user_id: &str,
        award_key: &str,
        force: bool,
    ) -> Result<bool> {
        let badge = self
            .badge_repo
            .get_badge(badge_id)
            .await?
            .ok_or(ServiceError::BadgeNotFound(badge_id))?;

        if !badge.is_active() {
            debug!("徽章未启用，跳过");
            record_badge_award(&badge.handler, "skipped");
            return Ok(false);
        }

        let duplicated = match badge.award_type {
            BadgeAwardType::Single => self.award_repo.has_badge(user_id, badge_id).await?,
            BadgeAwardType::Multiple if force => false,
            BadgeAwardType::Multiple => {
                self.award_repo
                    .is_awarded_with_key(user_id, badge_id, award_key)
                    .await?
            }
        };
        if duplicated {
            debug!("已授予过，跳过");
            record_badge_award(&badge.handler, "skipped");
            return Ok(false);
        }

        let award_id = self
            .award_repo
            .add_award(&NewBadgeAward::new(badge_id, user_id, award_key))
            .await?;

        record_badge_award(&badge.handler, "awarded");
        info!(award_id, badge = %badge.name, "徽章授予成功");
        Ok(true)
    }

    pub async fn list_badges(&self) -> Result<Vec<Badge>> {
        self.badge_repo.list_active_badges().await
    }

    pub async fn list_user_awards(&self, user_id: &str) -> Result<Vec<BadgeAward>> {
        self.award_repo.list_user_awards(user_id).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::fixtures::badge;
    use crate::models::BadgeStatus;
    use crate::repository::{MockBadgeAwardRepositoryTrait, MockBadgeRepositoryTrait};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Mutex;

    /// 内存版授予记录仓储
    #[derive(Default)]
    pub(crate) struct InMemoryAwards {
        pub awards: Mutex<Vec<BadgeAward>>,
    }

    impl InMemoryAwards {
        pub fn count(&self) -> usize {
            self.awards.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BadgeAwardRepositoryTrait for InMemoryAwards {
        async fn has_badge(&self, user_id: &str, badge_id: i64) -> Result<bool> {
            Ok(self
                .awards
                .lock()
                .unwrap()
                .iter()
                .any(|a| a.user_id == user_id && a.badge_id == badge_id))
        }

        async fn is_awarded_with_key(
            &self,
            user_id: &str,
            badge_id: i64,
            award_key: &str,
        ) -> Result<bool> {
            Ok(self.awards.lock().unwrap().iter().any(|a| {
                a.user_id == user_id && a.badge_id == badge_id && a.award_key == award_key
            }))
        }

        async fn add_award(&self, award: &NewBadgeAward) -> Result<i64> {
            let mut awards = self.awards.lock().unwrap();
            let id = awards.len() as i64 + 1;
            awards.push(BadgeAward {
                id,
                user_id: award.user_id.clone(),
                badge_id: award.badge_id,
                award_key: award.award_key.clone(),
                created_at: Utc::now(),
            });
            Ok(id)
        }

        async fn list_user_awards(&self, user_id: &str) -> Result<Vec<BadgeAward>> {
            Ok(self
                .awards
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    pub(crate) fn badge_repo(list: Vec<Badge>) -> MockBadgeRepositoryTrait {
        let mut mock = MockBadgeRepositoryTrait::new();
        mock.expect_get_badge()
            .returning(move |id| Ok(list.iter().find(|b| b.id == id).cloned()));
        mock
    }

    fn service(badges: Vec<Badge>) -> (BadgeAwardService, Arc<InMemoryAwards>) {
        let awards = Arc::new(InMemoryAwards::default());
        let svc = BadgeAwardService::new(Arc::new(badge_repo(badges)), awards.clone());
        (svc, awards)
    }

    #[tokio::test]
    async fn test_single_badge_awarded_once() {
        let (svc, awards) = service(vec![badge(1, "FirstPost", BadgeAwardType::Single, json!({}))]);

        assert!(svc.award(1, "u1", "10010000000000001", false).await.unwrap());
        assert!(!svc.award(1, "u1", "10010000000000001", false).await.unwrap());
        // Single 徽章换 key 或 force 都不会再次授予
        assert!(!svc.award(1, "u1", "10010000000000002", false).await.unwrap());
        assert!(!svc.award(1, "u1", "10010000000000001", true).await.unwrap());

        assert_eq!(awards.count(), 1);
    }

    #[tokio::test]
    async fn test_multiple_badge_with_force_awarded_twice() {
        let (svc, awards) = service(vec![badge(
            2,
            "ReachAnswerVote",
            BadgeAwardType::Multiple,
            json!({"amount": 10}),
        )]);

        assert!(svc.award(2, "u1", "k", true).await.unwrap());
        assert!(svc.award(2, "u1", "k", true).await.unwrap());
        assert_eq!(awards.count(), 2);
    }

    #[tokio::test]
    async fn test_multiple_badge_dedup_by_key() {
        let (svc, awards) = service(vec![badge(
            2,
            "ReachAnswerVote",
            BadgeAwardType::Multiple,
            json!({"amount": 10}),
        )]);

        assert!(svc.award(2, "u1", "a1", false).await.unwrap());
        assert!(!svc.award(2, "u1", "a1", false).await.unwrap());
        assert!(svc.award(2, "u1", "a2", false).await.unwrap());
        assert!(svc.award(2, "u2", "a1", false).await.unwrap());
        assert_eq!(awards.count(), 3);
        assert_eq!(svc.list_user_awards("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_badge() {
        let (svc, _) = service(vec![]);
        let err = svc.award(99, "u1", "k", false).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadgeNotFound(99)));
    }

    #[tokio::test]
    async fn test_inactive_badge_skipped() {
        let mut inactive = badge(3, "FirstPost", BadgeAwardType::Single, json!({}));
        inactive.status = BadgeStatus::Inactive;
        let (svc, awards) = service(vec![inactive]);

        assert!(!svc.award(3, "u1", "k", false).await.unwrap());
        assert_eq!(awards.count(), 0);
    }

    #[tokio::test]
    async fn test_award_written_once_per_grant() {
        let mut awards = MockBadgeAwardRepositoryTrait::new();
        awards.expect_has_badge().returning(|_, _| Ok(false));
        awards
            .expect_add_award()
            .withf(|a| a.badge_id == 5 && a.user_id == "u1" && a.award_key == "k")
            .times(1)
            .returning(|_| Ok(42));

        let svc = BadgeAwardService::new(
            Arc::new(badge_repo(vec![badge(5, "FirstPost", BadgeAwardType::Single, json!({}))])),
            Arc::new(awards),
        );
        assert!(svc.award(5, "u1", "k", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_write_is_not_counted() {
        let mut awards = MockBadgeAwardRepositoryTrait::new();
        awards.expect_has_badge().returning(|_, _| Ok(false));
        awards
            .expect_add_award()
            .times(1)
            .returning(|_| Err(ServiceError::Database(sqlx::Error::PoolTimedOut)));

        let svc = BadgeAwardService::new(
            Arc::new(badge_repo(vec![badge(5, "FirstPost", BadgeAwardType::Single, json!({}))])),
            Arc::new(awards),
        );
        let err = svc.award(5, "u1", "k", false).await.unwrap_err();
        assert!(matches!(err, ServiceError::Database(_)));
        assert!(err.is_retryable());
    }
}
