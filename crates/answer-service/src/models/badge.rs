//! 徽章相关实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 徽章等级
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum BadgeLevel {
    #[default]
    Bronze,
    Silver,
    Gold,
}

/// 授予方式
///
/// `Single` 每个用户至多持有一次；`Multiple` 按 award_key 区分，可多次获得
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum BadgeAwardType {
    #[default]
    Single,
    Multiple,
}

/// 徽章状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum BadgeStatus {
    #[default]
    Active,
    Inactive,
}

/// 徽章定义
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i64,
    pub name: String,
    #[sqlx(default)]
    pub icon: Option<String>,
    #[sqlx(default)]
    pub description: Option<String>,
    pub level: BadgeLevel,
    pub award_type: BadgeAwardType,
    /// 规则处理器名称，如 `FirstPost`、`ReachAnswerVote`
    pub handler: String,
    /// 规则参数，阈值类规则读取 `amount`
    pub param: Value,
    pub status: BadgeStatus,
    /// 已授予次数
    pub award_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Badge {
    pub fn is_active(&self) -> bool {
        self.status == BadgeStatus::Active
    }

    /// 阈值类规则的 `param.amount`
    pub fn param_amount(&self) -> Option<i64> {
        self.param.get("amount").and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

/// 授予记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BadgeAward {
    pub id: i64,
    pub user_id: String,
    pub badge_id: i64,
    /// 幂等键，通常是触发授予的对象 ID
    pub award_key: String,
    pub created_at: DateTime<Utc>,
}

/// 待写入的授予记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBadgeAward {
    pub user_id: String,
    pub badge_id: i64,
    pub award_key: String,
}

impl NewBadgeAward {
    pub fn new(badge_id: i64, user_id: impl Into<String>, award_key: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            badge_id,
            award_key: award_key.into(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::badge;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_amount() {
        let cases = [
            (json!({"amount": 10}), Some(10)),
            (json!({"amount": "25"}), Some(25)),
            (json!({"amount": "x"}), None),
            (json!({}), None),
            (Value::Null, None),
        ];
        for (param, expected) in cases {
            let b = badge(1, "ReachAnswerVote", BadgeAwardType::Multiple, param.clone());
            assert_eq!(b.param_amount(), expected, "{param}");
        }
    }

    #[test]
    fn test_award_type_serde() {
        let t: BadgeAwardType = serde_json::from_str("\"multiple\"").unwrap();
        assert_eq!(t, BadgeAwardType::Multiple);
        assert_eq!(serde_json::to_string(&BadgeLevel::Gold).unwrap(), "\"gold\"");
    }
}
