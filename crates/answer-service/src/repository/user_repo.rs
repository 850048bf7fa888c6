//! 用户仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::UserRepositoryTrait;
use crate::error::Result;
use crate::models::UserBasicInfo;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn get_user_basic_info_by_id(&self, user_id: &str) -> Result<Option<UserBasicInfo>> {
        let user = sqlx::query_as::<_, UserBasicInfo>(
            r#"
            SELECT id, username, display_name, rank, is_admin, status
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserBasicInfo>> {
        let user = sqlx::query_as::<_, UserBasicInfo>(
            r#"
            SELECT id, username, display_name, rank, is_admin, status
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
