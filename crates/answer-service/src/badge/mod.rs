//! 徽章模块
//!
//! 事件 -> 规则评估 -> 授予。规则只产出候选记录，去重和写入集中在 `BadgeAwardService`。

mod award_service;
mod handler;
mod rules;

pub use award_service::BadgeAwardService;
pub use handler::BadgeEventHandler;
pub use rules::{BadgeHandler, BadgeRuleEvaluator};
