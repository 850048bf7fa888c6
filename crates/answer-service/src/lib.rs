//! 问答社区领域服务
//!
//! 提供等级权限判定、徽章授予流水线、站内通知和搜索语法解析。
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 数据访问层（trait + PostgreSQL 实现）
//! - `rank`: 基于声望的操作权限判定
//! - `badge`: 徽章规则评估与授予
//! - `notification`: 站内通知事件处理器
//! - `search`: 搜索语法解析与检索

pub mod badge;
pub mod error;
pub mod models;
pub mod notification;
pub mod rank;
pub mod repository;
pub mod search;

pub use badge::{BadgeAwardService, BadgeEventHandler, BadgeRuleEvaluator};
pub use error::{Result, ServiceError};
pub use models::*;
pub use notification::NotificationEventHandler;
pub use rank::{Action, RankService};
pub use search::{SearchOrder, SearchRequest, SearchService, SearchSyntax};
