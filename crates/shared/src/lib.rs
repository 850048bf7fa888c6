//! 共享库
//!
//! 包含问答站点各服务共用的配置、错误处理、数据库连接、缓存、领域事件与事件队列等基础设施代码。

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod event_queue;
pub mod events;
pub mod observability;
