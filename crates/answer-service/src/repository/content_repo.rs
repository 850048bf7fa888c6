//! 内容写操作仓储
//!
//! 删除均为软删除（修改 status），投票在事务内同时维护 vote 表和对象的 vote_count。
//! 新对象的 ID 由各类型的数据库序列生成。

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::ContentRepositoryTrait;
use crate::error::{Result, ServiceError};
use crate::models::{
    NewAnswer, NewComment, NewQuestion, NewReport, ObjectInfo, ObjectType, QuestionStatus,
    VoteResult,
};

pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn next_object_id<'e, E>(executor: E, object_type: ObjectType) -> Result<String>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let sequence = id_sequence(object_type).ok_or_else(|| {
            ServiceError::Validation(format!("{object_type} 不由本仓储创建"))
        })?;
        let seq = sqlx::query_scalar::<_, i64>(&format!("SELECT nextval('{sequence}')"))
            .fetch_one(executor)
            .await?;
        Ok(object_type.object_id(seq))
    }
}

fn id_sequence(object_type: ObjectType) -> Option<&'static str> {
    match object_type {
        ObjectType::Question => Some("question_seq"),
        ObjectType::Answer => Some("answer_seq"),
        ObjectType::Comment => Some("comment_seq"),
        ObjectType::Tag | ObjectType::User => None,
    }
}

/// 可投票对象对应的表
fn vote_table(object_type: ObjectType) -> Option<&'static str> {
    match object_type {
        ObjectType::Question => Some("question"),
        ObjectType::Answer => Some("answer"),
        ObjectType::Comment => Some("comment"),
        ObjectType::Tag | ObjectType::User => None,
    }
}

#[async_trait]
impl ContentRepositoryTrait for ContentRepository {
    async fn create_question(&self, question: &NewQuestion) -> Result<String> {
        let id = Self::next_object_id(&self.pool, ObjectType::Question).await?;

        sqlx::query(
            r#"
            INSERT INTO question (id, user_id, title, original_text)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&id)
        .bind(&question.user_id)
        .bind(&question.title)
        .bind(&question.content)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_question(&self, question_id: &str, title: &str, content: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE question SET title = $2, original_text = $3, updated_at = NOW()
            WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(question_id)
        .bind(title)
        .bind(content)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::ObjectNotFound(question_id.to_string()));
        }
        Ok(())
    }

    async fn create_answer(&self, answer: &NewAnswer) -> Result<String> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE question SET answer_count = answer_count + 1, updated_at = NOW()
            WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(&answer.question_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::ObjectNotFound(answer.question_id.clone()));
        }

        let id = Self::next_object_id(&mut *tx, ObjectType::Answer).await?;
        sqlx::query(
            r#"
            INSERT INTO answer (id, question_id, user_id, original_text)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&id)
        .bind(&answer.question_id)
        .bind(&answer.user_id)
        .bind(&answer.content)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update_answer(&self, answer_id: &str, content: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE answer SET original_text = $2, updated_at = NOW()
            WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(answer_id)
        .bind(content)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::ObjectNotFound(answer_id.to_string()));
        }
        Ok(())
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<String> {
        let id = Self::next_object_id(&self.pool, ObjectType::Comment).await?;

        sqlx::query(
            r#"
            INSERT INTO comment (id, user_id, object_id, question_id, original_text)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&id)
        .bind(&comment.user_id)
        .bind(&comment.object_id)
        .bind(&comment.question_id)
        .bind(&comment.content)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn add_report(&self, report: &NewReport) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO report (user_id, object_id, object_type, reason)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&report.user_id)
        .bind(&report.object_id)
        .bind(report.object_type.as_str())
        .bind(&report.reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn delete_question(&self, question_id: &str) -> Result<()> {
        self.update_question_status(question_id, QuestionStatus::Deleted)
            .await
    }

    async fn update_question_status(
        &self,
        question_id: &str,
        status: QuestionStatus,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE question SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(question_id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::ObjectNotFound(question_id.to_string()));
        }
        Ok(())
    }

    async fn set_question_pinned(&self, question_id: &str, pinned: bool) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE question SET pinned = $2, updated_at = NOW()
            WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(question_id)
        .bind(pinned)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::ObjectNotFound(question_id.to_string()));
        }
        Ok(())
    }

    async fn delete_answer(&self, answer_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let question_id = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE answer SET status = 'deleted', accepted = FALSE, updated_at = NOW()
            WHERE id = $1 AND status <> 'deleted'
            RETURNING question_id
            "#,
        )
        .bind(answer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::ObjectNotFound(answer_id.to_string()))?;

        sqlx::query(
            r#"
            UPDATE question
            SET answer_count = GREATEST(answer_count - 1, 0),
                accepted_answer_id = CASE WHEN accepted_answer_id = $2 THEN NULL
                                          ELSE accepted_answer_id END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(&question_id)
        .bind(answer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn accept_answer(&self, question_id: &str, answer_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE answer SET accepted = FALSE WHERE question_id = $1 AND accepted
            "#,
        )
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            UPDATE answer SET accepted = TRUE, updated_at = NOW()
            WHERE id = $1 AND question_id = $2 AND status <> 'deleted'
            "#,
        )
        .bind(answer_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::ObjectNotFound(answer_id.to_string()));
        }

        sqlx::query(
            r#"
            UPDATE question SET accepted_answer_id = $2, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(question_id)
        .bind(answer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE comment SET status = 'deleted', updated_at = NOW()
            WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(comment_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::ObjectNotFound(comment_id.to_string()));
        }
        Ok(())
    }

    async fn record_vote(
        &self,
        user_id: &str,
        object: &ObjectInfo,
        up: bool,
    ) -> Result<VoteResult> {
        let table = vote_table(object.object_type).ok_or_else(|| {
            ServiceError::Validation(format!("{} 不支持投票", object.object_type))
        })?;
        let requested: i16 = if up { 1 } else { -1 };

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, i16>(
            r#"
            SELECT vote FROM vote WHERE user_id = $1 AND object_id = $2 FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(&object.object_id)
        .fetch_optional(&mut *tx)
        .await?;

        let user_vote = if existing == Some(requested) {
            sqlx::query("DELETE FROM vote WHERE user_id = $1 AND object_id = $2")
                .bind(user_id)
                .bind(&object.object_id)
                .execute(&mut *tx)
                .await?;
            0
        } else {
            sqlx::query(
                r#"
                INSERT INTO vote (user_id, object_id, object_type, vote)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, object_id)
                DO UPDATE SET vote = EXCLUDED.vote, updated_at = NOW()
                "#,
            )
            .bind(user_id)
            .bind(&object.object_id)
            .bind(object.object_type.as_str())
            .bind(requested)
            .execute(&mut *tx)
            .await?;
            requested
        };

        let delta = i64::from(user_vote) - i64::from(existing.unwrap_or(0));
        let vote_count = sqlx::query_scalar::<_, i64>(&format!(
            "UPDATE {table} SET vote_count = vote_count + $1 WHERE id = $2 RETURNING vote_count"
        ))
        .bind(delta)
        .bind(&object.object_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::ObjectNotFound(object.object_id.clone()))?;

        tx.commit().await?;

        Ok(VoteResult {
            vote_count,
            user_vote,
        })
    }
}
