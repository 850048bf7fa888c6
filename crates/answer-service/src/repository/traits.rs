//! 仓储 Trait 定义
//!
//! 服务层依赖这些抽象而非具体实现；`testing` feature 下导出 mockall mock，供 HTTP 层测试复用

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Badge, BadgeAward, NewAnswer, NewBadgeAward, NewComment, NewNotification, NewQuestion,
    NewReport, ObjectInfo, QuestionStatus, UserBasicInfo, VoteResult,
};
use crate::search::{SearchFilter, SearchItem, SearchOrder};

/// 站点配置仓储
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ConfigRepositoryTrait: Send + Sync {
    /// 读取整数配置，未配置返回 None
    async fn get_int(&self, key: &str) -> Result<Option<i64>>;
}

/// 用户仓储
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn get_user_basic_info_by_id(&self, user_id: &str) -> Result<Option<UserBasicInfo>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserBasicInfo>>;
}

/// 对象归属查询
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ObjectInfoRepositoryTrait: Send + Sync {
    /// 对象不存在时返回 `ObjectNotFound`，ID 无法识别时返回 `InvalidObjectId`
    async fn get_info(&self, object_id: &str) -> Result<ObjectInfo>;
}

/// 内容写操作
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ContentRepositoryTrait: Send + Sync {
    /// 返回新问题 ID
    async fn create_question(&self, question: &NewQuestion) -> Result<String>;
    async fn update_question(&self, question_id: &str, title: &str, content: &str) -> Result<()>;
    /// 问题不存在或已删除时返回 `ObjectNotFound`
    async fn create_answer(&self, answer: &NewAnswer) -> Result<String>;
    async fn update_answer(&self, answer_id: &str, content: &str) -> Result<()>;
    async fn create_comment(&self, comment: &NewComment) -> Result<String>;
    async fn add_report(&self, report: &NewReport) -> Result<i64>;

    async fn delete_question(&self, question_id: &str) -> Result<()>;
    async fn update_question_status(&self, question_id: &str, status: QuestionStatus)
    -> Result<()>;
    async fn set_question_pinned(&self, question_id: &str, pinned: bool) -> Result<()>;
    async fn delete_answer(&self, answer_id: &str) -> Result<()>;
    async fn accept_answer(&self, question_id: &str, answer_id: &str) -> Result<()>;
    async fn delete_comment(&self, comment_id: &str) -> Result<()>;

    /// 记录投票；同方向重复投票视为撤销
    async fn record_vote(&self, user_id: &str, object: &ObjectInfo, up: bool)
    -> Result<VoteResult>;
}

/// 徽章定义仓储
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BadgeRepositoryTrait: Send + Sync {
    async fn get_badge(&self, id: i64) -> Result<Option<Badge>>;
    async fn list_active_badges(&self) -> Result<Vec<Badge>>;
    async fn list_active_by_handlers(&self, handlers: &[String]) -> Result<Vec<Badge>>;
}

/// 徽章授予记录仓储
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BadgeAwardRepositoryTrait: Send + Sync {
    /// 用户是否持有该徽章（任意 award_key）
    async fn has_badge(&self, user_id: &str, badge_id: i64) -> Result<bool>;
    /// 指定 award_key 是否已授予
    async fn is_awarded_with_key(&self, user_id: &str, badge_id: i64, award_key: &str)
    -> Result<bool>;
    /// 写入授予记录并累加徽章授予次数，两者同一事务提交
    async fn add_award(&self, award: &NewBadgeAward) -> Result<i64>;
    async fn list_user_awards(&self, user_id: &str) -> Result<Vec<BadgeAward>>;
}

/// 徽章规则所需的统计查询
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BadgeRuleRepositoryTrait: Send + Sync {
    async fn object_vote_count(&self, object_id: &str) -> Result<i64>;
    async fn accepted_answer_count(&self, user_id: &str) -> Result<i64>;
}

/// 通知仓储
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationRepositoryTrait: Send + Sync {
    async fn add_notification(&self, notification: &NewNotification) -> Result<i64>;
}

/// 搜索仓储
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SearchRepositoryTrait: Send + Sync {
    /// 返回当前页结果和总数
    async fn search(
        &self,
        filter: &SearchFilter,
        page: u32,
        size: u32,
        order: SearchOrder,
    ) -> Result<(Vec<SearchItem>, i64)>;
}
