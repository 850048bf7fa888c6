//! 等级权限
//!
//! 按"管理员 > 对象作者 > 声望阈值"的顺序判定用户能否执行某个操作。

mod action;
mod service;

pub use action::Action;
pub use service::{PermissionCheck, RankService};
