//! 领域模型
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

mod badge;
mod content;
mod notification;
mod object;
mod user;

pub use badge::*;
pub use content::*;
pub use notification::*;
pub use object::*;
pub use user::*;
