//! 对象归属查询
//!
//! 按对象 ID 中的类型码路由到对应的表

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::ObjectInfoRepositoryTrait;
use crate::error::{Result, ServiceError};
use crate::models::{ObjectInfo, ObjectType};

pub struct ObjectInfoRepository {
    pool: PgPool,
}

impl ObjectInfoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn question_info(&self, id: &str) -> Result<Option<ObjectInfo>> {
        let row = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT id, user_id FROM question WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, user_id)| {
            let mut info = ObjectInfo::new(id.clone(), ObjectType::Question, user_id);
            info.question_id = Some(id);
            info
        }))
    }

    async fn answer_info(&self, id: &str) -> Result<Option<ObjectInfo>> {
        let row = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT id, user_id, question_id FROM answer WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, user_id, question_id)| {
            let mut info = ObjectInfo::new(id.clone(), ObjectType::Answer, user_id);
            info.answer_id = Some(id);
            info.question_id = Some(question_id);
            info
        }))
    }

    async fn comment_info(&self, id: &str) -> Result<Option<ObjectInfo>> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(
            r#"
            SELECT id, user_id, object_id, question_id
            FROM comment
            WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, user_id, object_id, question_id)| {
            let mut info = ObjectInfo::new(id.clone(), ObjectType::Comment, user_id);
            info.comment_id = Some(id);
            if ObjectType::from_object_id(&object_id) == Some(ObjectType::Answer) {
                info.answer_id = Some(object_id);
            }
            info.question_id = Some(question_id);
            info
        }))
    }

    async fn tag_info(&self, id: &str) -> Result<Option<ObjectInfo>> {
        let row = sqlx::query_scalar::<_, String>(
            r#"
            SELECT id FROM tag WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|id| {
            let mut info = ObjectInfo::new(id.clone(), ObjectType::Tag, "");
            info.tag_id = Some(id);
            info
        }))
    }

    async fn user_info(&self, id: &str) -> Result<Option<ObjectInfo>> {
        let row = sqlx::query_scalar::<_, String>(
            r#"
            SELECT id FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        // 用户对象的"创建者"即其本人
        Ok(row.map(|id| ObjectInfo::new(id.clone(), ObjectType::User, id)))
    }
}

#[async_trait]
impl ObjectInfoRepositoryTrait for ObjectInfoRepository {
    async fn get_info(&self, object_id: &str) -> Result<ObjectInfo> {
        let object_type = ObjectType::from_object_id(object_id)
            .ok_or_else(|| ServiceError::InvalidObjectId(object_id.to_string()))?;

        let info = match object_type {
            ObjectType::Question => self.question_info(object_id).await?,
            ObjectType::Answer => self.answer_info(object_id).await?,
            ObjectType::Comment => self.comment_info(object_id).await?,
            ObjectType::Tag => self.tag_info(object_id).await?,
            ObjectType::User => self.user_info(object_id).await?,
        };

        info.ok_or_else(|| ServiceError::ObjectNotFound(object_id.to_string()))
    }
}
