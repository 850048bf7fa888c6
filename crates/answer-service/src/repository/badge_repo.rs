//! 徽章仓储
//!
//! 徽章定义、授予记录以及规则统计查询

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::{BadgeAwardRepositoryTrait, BadgeRepositoryTrait, BadgeRuleRepositoryTrait};
use crate::error::{Result, ServiceError};
use crate::models::{Badge, BadgeAward, BadgeStatus, NewBadgeAward, ObjectType};

// ==================== 徽章定义 ====================

pub struct BadgeRepository {
    pool: PgPool,
}

impl BadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BadgeRepositoryTrait for BadgeRepository {
    async fn get_badge(&self, id: i64) -> Result<Option<Badge>> {
        let badge = sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, name, icon, description, level, award_type, handler, param,
                   status, award_count, created_at, updated_at
            FROM badge
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(badge)
    }

    async fn list_active_badges(&self) -> Result<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, name, icon, description, level, award_type, handler, param,
                   status, award_count, created_at, updated_at
            FROM badge
            WHERE status = $1
            ORDER BY id ASC
            "#,
        )
        .bind(BadgeStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    async fn list_active_by_handlers(&self, handlers: &[String]) -> Result<Vec<Badge>> {
        if handlers.is_empty() {
            return Ok(vec![]);
        }

        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, name, icon, description, level, award_type, handler, param,
                   status, award_count, created_at, updated_at
            FROM badge
            WHERE status = $1 AND handler = ANY($2)
            ORDER BY id ASC
            "#,
        )
        .bind(BadgeStatus::Active)
        .bind(handlers)
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }
}

// ==================== 授予记录 ====================

pub struct BadgeAwardRepository {
    pool: PgPool,
}

impl BadgeAwardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BadgeAwardRepositoryTrait for BadgeAwardRepository {
    async fn has_badge(&self, user_id: &str, badge_id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM badge_award WHERE user_id = $1 AND badge_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn is_awarded_with_key(
        &self,
        user_id: &str,
        badge_id: i64,
        award_key: &str,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM badge_award
                WHERE user_id = $1 AND badge_id = $2 AND award_key = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .bind(award_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn add_award(&self, award: &NewBadgeAward) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO badge_award (user_id, badge_id, award_key)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&award.user_id)
        .bind(award.badge_id)
        .bind(&award.award_key)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE badge SET award_count = award_count + 1, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(award.badge_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(id)
    }

    async fn list_user_awards(&self, user_id: &str) -> Result<Vec<BadgeAward>> {
        let awards = sqlx::query_as::<_, BadgeAward>(
            r#"
            SELECT id, user_id, badge_id, award_key, created_at
            FROM badge_award
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(awards)
    }
}

// ==================== 规则统计 ====================

pub struct BadgeRuleRepository {
    pool: PgPool,
}

impl BadgeRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BadgeRuleRepositoryTrait for BadgeRuleRepository {
    async fn object_vote_count(&self, object_id: &str) -> Result<i64> {
        let sql = match ObjectType::from_object_id(object_id) {
            Some(ObjectType::Question) => "SELECT vote_count FROM question WHERE id = $1",
            Some(ObjectType::Answer) => "SELECT vote_count FROM answer WHERE id = $1",
            Some(ObjectType::Comment) => "SELECT vote_count FROM comment WHERE id = $1",
            _ => return Err(ServiceError::InvalidObjectId(object_id.to_string())),
        };

        let count = sqlx::query_scalar::<_, i64>(sql)
            .bind(object_id)
            .fetch_optional(&self.pool)
            .await?;

        count.ok_or_else(|| ServiceError::ObjectNotFound(object_id.to_string()))
    }

    async fn accepted_answer_count(&self, user_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM answer
            WHERE user_id = $1 AND accepted AND status <> 'deleted'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
