//! 搜索仓储
//!
//! 用 `QueryBuilder` 拼接问题和回答两个子查询（UNION ALL），所有用户输入都以绑定参数传入。

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::traits::SearchRepositoryTrait;
use crate::error::Result;
use crate::search::{SearchFilter, SearchItem, SearchOrder};

/// 摘要截取长度
const EXCERPT_LEN: i32 = 200;

pub struct SearchRepository {
    pool: PgPool,
}

impl SearchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 转义 LIKE 通配符后包成 `%word%`
fn like_pattern(word: &str) -> String {
    let mut escaped = String::with_capacity(word.len() + 2);
    escaped.push('%');
    for c in word.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn order_clause(order: SearchOrder) -> &'static str {
    match order {
        SearchOrder::Relevance => " ORDER BY t.relevance DESC, t.vote_count DESC, t.created_at DESC",
        SearchOrder::Newest => " ORDER BY t.created_at DESC",
        SearchOrder::Active => " ORDER BY t.updated_at DESC",
        SearchOrder::Score => " ORDER BY t.vote_count DESC, t.created_at DESC",
    }
}

/// 标题命中的关键字个数
fn push_relevance(qb: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter) {
    if filter.words.is_empty() {
        qb.push("0");
        return;
    }
    qb.push("(");
    for (i, word) in filter.words.iter().enumerate() {
        if i > 0 {
            qb.push(" + ");
        }
        qb.push("CASE WHEN q.title ILIKE ")
            .push_bind(like_pattern(word))
            .push(" THEN 1 ELSE 0 END");
    }
    qb.push(")");
}

/// 关键字和短语：问题匹配标题或正文，回答匹配正文
fn push_text_match(qb: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter, is_question: bool) {
    for term in filter.words.iter().chain(filter.phrase.iter()) {
        let pattern = like_pattern(term);
        if is_question {
            qb.push(" AND (q.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR q.original_text ILIKE ")
                .push_bind(pattern)
                .push(")");
        } else {
            qb.push(" AND a.original_text ILIKE ").push_bind(pattern);
        }
    }
}

fn push_tag_match(qb: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter) {
    if let Some(tag) = &filter.tag {
        qb.push(
            " AND EXISTS (SELECT 1 FROM tag_rel tr JOIN tag tg ON tg.id = tr.tag_id \
             WHERE tr.object_id = q.id AND tg.slug_name = ",
        )
        .push_bind(tag.clone())
        .push(")");
    }
}

fn push_question_select(qb: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter) {
    qb.push(
        "SELECT q.id AS object_id, 'question'::varchar AS object_type, q.id AS question_id, \
         q.title AS title, LEFT(q.original_text, ",
    )
    .push(EXCERPT_LEN)
    .push(
        ") AS excerpt, q.user_id AS user_id, q.vote_count AS vote_count, \
         q.answer_count AS answer_count, (q.accepted_answer_id IS NOT NULL) AS accepted, \
         q.created_at AS created_at, q.updated_at AS updated_at, ",
    );
    push_relevance(qb, filter);
    qb.push(" AS relevance FROM question q WHERE q.status <> 'deleted'");

    push_text_match(qb, filter, true);
    push_tag_match(qb, filter);
    if let Some(user_id) = &filter.user_id {
        qb.push(" AND q.user_id = ").push_bind(user_id.clone());
    }
    if let Some(min_score) = filter.min_score {
        qb.push(" AND q.vote_count >= ").push_bind(min_score);
    }
    if let Some(min_answers) = filter.min_answers {
        qb.push(" AND q.answer_count >= ").push_bind(min_answers);
    }
    match filter.has_accepted {
        Some(true) => {
            qb.push(" AND q.accepted_answer_id IS NOT NULL");
        }
        Some(false) => {
            qb.push(" AND q.accepted_answer_id IS NULL");
        }
        None => {}
    }
}

fn push_answer_select(qb: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter) {
    qb.push(
        "SELECT a.id AS object_id, 'answer'::varchar AS object_type, a.question_id AS question_id, \
         q.title AS title, LEFT(a.original_text, ",
    )
    .push(EXCERPT_LEN)
    .push(
        ") AS excerpt, a.user_id AS user_id, a.vote_count AS vote_count, \
         0::bigint AS answer_count, a.accepted AS accepted, \
         a.created_at AS created_at, a.updated_at AS updated_at, ",
    );
    push_relevance(qb, filter);
    qb.push(
        " AS relevance FROM answer a JOIN question q ON q.id = a.question_id \
         WHERE a.status <> 'deleted' AND q.status <> 'deleted'",
    );

    push_text_match(qb, filter, false);
    push_tag_match(qb, filter);
    if let Some(user_id) = &filter.user_id {
        qb.push(" AND a.user_id = ").push_bind(user_id.clone());
    }
    if let Some(min_score) = filter.min_score {
        qb.push(" AND a.vote_count >= ").push_bind(min_score);
    }
    if let Some(accepted) = filter.accepted {
        qb.push(" AND a.accepted = ").push_bind(accepted);
    }
}

fn push_union(qb: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter) {
    let questions = filter.scope.includes_questions();
    if questions {
        push_question_select(qb, filter);
    }
    if filter.scope.includes_answers() {
        if questions {
            qb.push(" UNION ALL ");
        }
        push_answer_select(qb, filter);
    }
}

#[async_trait]
impl SearchRepositoryTrait for SearchRepository {
    async fn search(
        &self,
        filter: &SearchFilter,
        page: u32,
        size: u32,
        order: SearchOrder,
    ) -> Result<(Vec<SearchItem>, i64)> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM (");
        push_union(&mut count_qb, filter);
        count_qb.push(") t");
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        if total == 0 {
            return Ok((vec![], 0));
        }

        let offset = i64::from(page.saturating_sub(1)) * i64::from(size);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT t.* FROM (");
        push_union(&mut qb, filter);
        qb.push(") t")
            .push(order_clause(order))
            .push(" LIMIT ")
            .push_bind(i64::from(size))
            .push(" OFFSET ")
            .push_bind(offset);

        let items = qb
            .build_query_as::<SearchItem>()
            .fetch_all(&self.pool)
            .await?;

        Ok((items, total))
    }
}
