//! 应用状态
//!
//! 服务和仓储都以 `Arc` 共享；`AppState` 克隆开销只有引用计数。

use std::sync::Arc;
use std::time::Duration;

use answer_service::repository::{
    BadgeAwardRepository, BadgeRepository, BadgeRuleRepository, ConfigRepository,
    ContentRepository, ContentRepositoryTrait, NotificationRepository, ObjectInfoRepository,
    ObjectInfoRepositoryTrait, SearchRepository, UserRepository,
};
use answer_service::{
    BadgeAwardService, BadgeEventHandler, BadgeRuleEvaluator, NotificationEventHandler,
    RankService, SearchService,
};
use answer_shared::cache::Cache;
use answer_shared::config::AppConfig;
use answer_shared::event_queue::EventQueue;
use answer_shared::events::EventHandler;
use sqlx::PgPool;

use crate::auth::{JwtConfig, JwtManager};
use crate::i18n::MessageRegistry;

/// Axum 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub rank_service: Arc<RankService>,
    pub search_service: Arc<SearchService>,
    pub badge_service: Arc<BadgeAwardService>,
    pub content_repo: Arc<dyn ContentRepositoryTrait>,
    pub object_repo: Arc<dyn ObjectInfoRepositoryTrait>,
    pub events: EventQueue,
    pub jwt: Arc<JwtManager>,
    pub messages: Arc<MessageRegistry>,
}

/// PostgreSQL 之上的全部组件
pub struct Components {
    pub rank_service: Arc<RankService>,
    pub search_service: Arc<SearchService>,
    pub badge_service: Arc<BadgeAwardService>,
    pub content_repo: Arc<dyn ContentRepositoryTrait>,
    pub object_repo: Arc<dyn ObjectInfoRepositoryTrait>,
    /// 事件队列的消费者，按顺序执行
    pub event_handlers: Vec<Arc<dyn EventHandler>>,
}

impl Components {
    /// 基于连接池装配服务；提供 Redis 时配置项走缓存
    pub fn build(pool: &PgPool, cache: Option<Arc<Cache>>, config: &AppConfig) -> Self {
        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let object_repo: Arc<dyn ObjectInfoRepositoryTrait> =
            Arc::new(ObjectInfoRepository::new(pool.clone()));
        let content_repo: Arc<dyn ContentRepositoryTrait> =
            Arc::new(ContentRepository::new(pool.clone()));

        let mut config_repo = ConfigRepository::new(pool.clone());
        if let Some(cache) = cache {
            config_repo =
                config_repo.with_cache(cache, Duration::from_secs(config.redis.config_ttl_seconds));
        }

        let rank_service = Arc::new(RankService::new(
            user_repo.clone(),
            Arc::new(config_repo),
            object_repo.clone(),
        ));
        let search_service = Arc::new(SearchService::new(
            Arc::new(SearchRepository::new(pool.clone())),
            user_repo,
        ));

        let badge_repo = Arc::new(BadgeRepository::new(pool.clone()));
        let badge_service = Arc::new(BadgeAwardService::new(
            badge_repo.clone(),
            Arc::new(BadgeAwardRepository::new(pool.clone())),
        ));
        let notification_repo = Arc::new(NotificationRepository::new(pool.clone()));

        let badge_handler = BadgeEventHandler::new(
            BadgeRuleEvaluator::new(badge_repo, Arc::new(BadgeRuleRepository::new(pool.clone()))),
            badge_service.clone(),
        )
        .with_notifications(notification_repo.clone());
        let notification_handler = NotificationEventHandler::new(notification_repo);

        Self {
            rank_service,
            search_service,
            badge_service,
            content_repo,
            object_repo,
            event_handlers: vec![Arc::new(badge_handler), Arc::new(notification_handler)],
        }
    }

    pub fn into_state(self, events: EventQueue, config: &AppConfig) -> AppState {
        AppState {
            rank_service: self.rank_service,
            search_service: self.search_service,
            badge_service: self.badge_service,
            content_repo: self.content_repo,
            object_repo: self.object_repo,
            events,
            jwt: Arc::new(JwtManager::new(JwtConfig::from(&config.auth))),
            messages: Arc::new(MessageRegistry::builtin()),
        }
    }
}
