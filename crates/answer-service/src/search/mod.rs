//! 搜索
//!
//! `parser` 负责识别查询前缀；`service` 把解析结果转换为 `SearchFilter` 交给仓储执行。

mod parser;
mod service;

pub use parser::{ParsedQuery, SearchSyntax};
pub use service::SearchService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};
use crate::models::ObjectType;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
/// 参与匹配的关键字上限
pub const MAX_SEARCH_WORDS: usize = 5;

/// 排序方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOrder {
    /// 标题命中优先，其次得分
    #[default]
    Relevance,
    Newest,
    /// 最近更新
    Active,
    Score,
}

/// 搜索请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub q: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub order: SearchOrder,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl SearchRequest {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            page: default_page(),
            size: default_size(),
            order: SearchOrder::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.q.trim().is_empty() {
            return Err(ServiceError::Validation("q 不能为空".to_string()));
        }
        if self.page < 1 {
            return Err(ServiceError::Validation("page 必须大于等于 1".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.size) {
            return Err(ServiceError::Validation(format!(
                "size 必须在 1 到 {MAX_PAGE_SIZE} 之间"
            )));
        }
        Ok(())
    }
}

/// 搜索的对象范围
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    #[default]
    All,
    Question,
    Answer,
}

impl SearchScope {
    pub fn includes_questions(&self) -> bool {
        matches!(self, Self::All | Self::Question)
    }

    pub fn includes_answers(&self) -> bool {
        matches!(self, Self::All | Self::Answer)
    }
}

/// 仓储层执行的检索条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchFilter {
    pub scope: SearchScope,
    /// 每个关键字都需命中（AND）
    pub words: Vec<String>,
    /// 整句匹配
    pub phrase: Option<String>,
    /// 标签 slug
    pub tag: Option<String>,
    pub user_id: Option<String>,
    pub min_score: Option<i64>,
    pub min_answers: Option<i64>,
    /// 回答是否被采纳
    pub accepted: Option<bool>,
    /// 问题是否已有采纳的回答
    pub has_accepted: Option<bool>,
}

impl SearchFilter {
    /// 拆分关键字，超出上限的部分丢弃
    pub fn split_words(words: &str) -> Vec<String> {
        words
            .split_whitespace()
            .take(MAX_SEARCH_WORDS)
            .map(str::to_string)
            .collect()
    }
}

/// 搜索结果项
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub object_id: String,
    pub object_type: ObjectType,
    pub question_id: String,
    pub title: String,
    pub excerpt: String,
    pub user_id: String,
    pub vote_count: i64,
    pub answer_count: i64,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 搜索响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub total: i64,
    pub page: u32,
    pub size: u32,
    pub syntax: SearchSyntax,
    pub items: Vec<SearchItem>,
}

impl SearchResponse {
    pub fn empty(request: &SearchRequest, syntax: SearchSyntax) -> Self {
        Self {
            total: 0,
            page: request.page,
            size: request.size,
            syntax,
            items: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert!(SearchRequest::new("rust").validate().is_ok());
        assert!(SearchRequest::new("   ").validate().is_err());

        let mut req = SearchRequest::new("rust");
        req.page = 0;
        assert!(req.validate().is_err());

        for (size, ok) in [(0, false), (1, true), (100, true), (101, false)] {
            let mut req = SearchRequest::new("rust");
            req.size = size;
            assert_eq!(req.validate().is_ok(), ok, "size={size}");
        }
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: SearchRequest = serde_json::from_str(r#"{"q":"x"}"#).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.size, DEFAULT_PAGE_SIZE);
        assert_eq!(req.order, SearchOrder::Relevance);

        let req: SearchRequest = serde_json::from_str(r#"{"q":"x","order":"newest"}"#).unwrap();
        assert_eq!(req.order, SearchOrder::Newest);
    }

    #[test]
    fn test_split_words_caps_count() {
        assert_eq!(SearchFilter::split_words("  a  b "), vec!["a", "b"]);
        assert_eq!(SearchFilter::split_words("1 2 3 4 5 6 7").len(), MAX_SEARCH_WORDS);
        assert!(SearchFilter::split_words("").is_empty());
    }
}
