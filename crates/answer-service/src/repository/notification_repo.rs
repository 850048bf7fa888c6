//! 通知仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::NotificationRepositoryTrait;
use crate::error::Result;
use crate::models::NewNotification;

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepositoryTrait for NotificationRepository {
    async fn add_notification(&self, notification: &NewNotification) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO notification (user_id, trigger_user_id, object_id, notification_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&notification.user_id)
        .bind(&notification.trigger_user_id)
        .bind(&notification.object_id)
        .bind(notification.notification_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
