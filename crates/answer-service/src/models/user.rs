//! 用户基本信息

use serde::{Deserialize, Serialize};

/// 账户状态
///
/// 用户从不物理删除，注销只修改状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Normal,
    Suspended,
    Deleted,
    Inactive,
}

/// 权限判定所需的用户信息
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserBasicInfo {
    pub id: String,
    pub username: String,
    pub display_name: String,
    /// 声望值
    pub rank: i64,
    pub is_admin: bool,
    pub status: UserStatus,
}
