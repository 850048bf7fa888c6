//! 数据访问层
//!
//! 每个仓储实现对应的 trait，服务层只依赖 trait

mod badge_repo;
mod config_repo;
mod content_repo;
mod notification_repo;
mod object_repo;
mod search_repo;
pub mod traits;
mod user_repo;

pub use badge_repo::{BadgeAwardRepository, BadgeRepository, BadgeRuleRepository};
pub use config_repo::ConfigRepository;
pub use content_repo::ContentRepository;
pub use notification_repo::NotificationRepository;
pub use object_repo::ObjectInfoRepository;
pub use search_repo::SearchRepository;
pub use traits::*;
pub use user_repo::UserRepository;
