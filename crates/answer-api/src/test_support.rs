//! 路由测试脚手架
//!
//! 用 mockall 仓储装配完整的 `AppState`，事件队列只挂一个记录用的处理器。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use answer_service::repository::{
    MockBadgeAwardRepositoryTrait, MockBadgeRepositoryTrait, MockConfigRepositoryTrait,
    MockContentRepositoryTrait, MockObjectInfoRepositoryTrait, MockSearchRepositoryTrait,
    MockUserRepositoryTrait,
};
use answer_service::{
    BadgeAwardService, ObjectInfo, RankService, SearchService, ServiceError, UserBasicInfo,
    UserStatus,
};
use answer_shared::config::EventQueueConfig;
use answer_shared::error::Result as SharedResult;
use answer_shared::event_queue::EventQueue;
use answer_shared::events::{EventHandler, EventMsg, EventType};
use async_trait::async_trait;
use axum::Router;
use tokio::sync::Notify;

use crate::auth::{JwtConfig, JwtManager};
use crate::i18n::MessageRegistry;
use crate::routes::build_router;
use crate::state::AppState;

/// 记录收到的全部事件
#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<EventMsg>>,
    notify: Notify,
}

impl RecordingHandler {
    pub fn recorded(&self) -> Vec<EventMsg> {
        self.events.lock().unwrap().clone()
    }

    /// 等待至少 `n` 条事件，超时后按当前记录断言
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> Vec<EventMsg> {
        let _ = tokio::time::timeout(timeout, async {
            loop {
                let notified = self.notify.notified();
                if self.events.lock().unwrap().len() >= n {
                    return;
                }
                notified.await;
            }
        })
        .await;

        let events = self.recorded();
        assert!(events.len() >= n, "expected {n} events, got {}", events.len());
        events
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn supports(&self, _event_type: &EventType) -> bool {
        true
    }

    async fn handle(&self, event: &EventMsg) -> SharedResult<()> {
        self.events.lock().unwrap().push(event.clone());
        self.notify.notify_waiters();
        Ok(())
    }
}

pub struct TestApp {
    pub content: MockContentRepositoryTrait,
    pub search: MockSearchRepositoryTrait,
    pub badges: MockBadgeRepositoryTrait,
    pub awards: MockBadgeAwardRepositoryTrait,
    users: Vec<UserBasicInfo>,
    thresholds: HashMap<String, i64>,
    objects: HashMap<String, ObjectInfo>,
    jwt: JwtManager,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            content: MockContentRepositoryTrait::new(),
            search: MockSearchRepositoryTrait::new(),
            badges: MockBadgeRepositoryTrait::new(),
            awards: MockBadgeAwardRepositoryTrait::new(),
            users: vec![],
            thresholds: HashMap::new(),
            objects: HashMap::new(),
            jwt: JwtManager::new(JwtConfig::default()),
        }
    }

    pub fn with_user(mut self, id: &str, rank: i64, is_admin: bool) -> Self {
        self.users.push(UserBasicInfo {
            id: id.to_string(),
            username: format!("user_{id}"),
            display_name: id.to_string(),
            rank,
            is_admin,
            status: UserStatus::Normal,
        });
        self
    }

    pub fn with_threshold(mut self, key: &str, rank: i64) -> Self {
        self.thresholds.insert(key.to_string(), rank);
        self
    }

    pub fn with_object(mut self, object: ObjectInfo) -> Self {
        self.objects.insert(object.object_id.clone(), object);
        self
    }

    pub fn token(&self, user_id: &str) -> String {
        let (token, _) = self
            .jwt
            .generate_token(user_id, &format!("user_{user_id}"))
            .unwrap();
        token
    }

    pub fn build(self) -> (Router, Arc<RecordingHandler>) {
        let Self {
            mut content,
            search,
            badges,
            awards,
            users,
            thresholds,
            objects,
            jwt,
        } = self;

        let mut user_repo = MockUserRepositoryTrait::new();
        let by_id = users.clone();
        user_repo
            .expect_get_user_basic_info_by_id()
            .returning(move |id| Ok(by_id.iter().find(|u| u.id == id).cloned()));
        user_repo
            .expect_get_user_by_username()
            .returning(move |name| Ok(users.iter().find(|u| u.username == name).cloned()));

        let mut config_repo = MockConfigRepositoryTrait::new();
        config_repo
            .expect_get_int()
            .returning(move |key| Ok(thresholds.get(key).copied()));

        let mut object_repo = MockObjectInfoRepositoryTrait::new();
        object_repo.expect_get_info().returning(move |id| {
            objects
                .get(id)
                .cloned()
                .ok_or_else(|| ServiceError::ObjectNotFound(id.to_string()))
        });

        content.expect_delete_question().returning(|_| Ok(()));
        content.expect_update_question_status().returning(|_, _| Ok(()));
        content.expect_set_question_pinned().returning(|_, _| Ok(()));
        content.expect_delete_answer().returning(|_| Ok(()));
        content.expect_accept_answer().returning(|_, _| Ok(()));
        content.expect_delete_comment().returning(|_| Ok(()));

        let user_repo = Arc::new(user_repo);
        let object_repo = Arc::new(object_repo);

        let recorder = Arc::new(RecordingHandler::default());
        let handlers: Vec<Arc<dyn EventHandler>> = vec![recorder.clone()];
        let (events, _worker) = EventQueue::start(&EventQueueConfig::default(), handlers);

        let state = AppState {
            rank_service: Arc::new(RankService::new(
                user_repo.clone(),
                Arc::new(config_repo),
                object_repo.clone(),
            )),
            search_service: Arc::new(SearchService::new(Arc::new(search), user_repo)),
            badge_service: Arc::new(BadgeAwardService::new(Arc::new(badges), Arc::new(awards))),
            content_repo: Arc::new(content),
            object_repo,
            events,
            jwt: Arc::new(jwt),
            messages: Arc::new(MessageRegistry::builtin()),
        };

        (build_router(state), recorder)
    }
}
