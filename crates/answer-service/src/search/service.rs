//! 搜索服务

use std::sync::Arc;
use std::time::Instant;

use answer_shared::observability::metrics::record_search_query;
use tracing::{debug, info};

use super::{
    ParsedQuery, SearchFilter, SearchRequest, SearchResponse, SearchScope, SearchSyntax,
};
use crate::error::{Result, ServiceError};
use crate::repository::{SearchRepositoryTrait, UserRepositoryTrait};

/// `user:me` 中代表当前用户的关键字
const CURRENT_USER_ALIAS: &str = "me";

pub struct SearchService {
    search_repo: Arc<dyn SearchRepositoryTrait>,
    user_repo: Arc<dyn UserRepositoryTrait>,
}

impl SearchService {
    pub fn new(
        search_repo: Arc<dyn SearchRepositoryTrait>,
        user_repo: Arc<dyn UserRepositoryTrait>,
    ) -> Self {
        Self {
            search_repo,
            user_repo,
        }
    }

    /// 执行搜索
    ///
    /// `current_user_id` 用于解析 `user:me`；作者不存在时返回空结果而不是报错。
    pub async fn search(
        &self,
        request: &SearchRequest,
        current_user_id: Option<&str>,
    ) -> Result<SearchResponse> {
        request.validate()?;

        let start = Instant::now();
        let parsed = SearchSyntax::parse(&request.q);

        let Some(filter) = self.build_filter(&parsed, current_user_id).await? else {
            debug!(syntax = %parsed.syntax, exp = %parsed.exp, "搜索条件无法满足，返回空结果");
            return Ok(SearchResponse::empty(request, parsed.syntax));
        };

        let (items, total) = self
            .search_repo
            .search(&filter, request.page, request.size, request.order)
            .await?;

        record_search_query(parsed.syntax.as_str(), start.elapsed().as_secs_f64());
        info!(
            syntax = %parsed.syntax,
            total,
            page = request.page,
            "搜索完成"
        );

        Ok(SearchResponse {
            total,
            page: request.page,
            size: request.size,
            syntax: parsed.syntax,
            items,
        })
    }

    /// 把解析结果转换为检索条件，None 表示结果必然为空
    pub async fn build_filter(
        &self,
        parsed: &ParsedQuery,
        current_user_id: Option<&str>,
    ) -> Result<Option<SearchFilter>> {
        let mut filter = SearchFilter {
            words: SearchFilter::split_words(&parsed.words),
            ..Default::default()
        };

        match parsed.syntax {
            SearchSyntax::Tag => {
                filter.scope = SearchScope::Question;
                filter.tag = Some(parsed.exp.to_lowercase());
            }
            SearchSyntax::Author => {
                match self.resolve_author(&parsed.exp, current_user_id).await? {
                    Some(user_id) => filter.user_id = Some(user_id),
                    None => return Ok(None),
                }
            }
            SearchSyntax::Score => {
                filter.min_score = Some(parse_number(&parsed.exp)?);
            }
            SearchSyntax::AnswerCount => {
                filter.scope = SearchScope::Question;
                filter.min_answers = Some(parse_number(&parsed.exp)?);
            }
            SearchSyntax::Accepted => {
                filter.scope = SearchScope::Answer;
                filter.accepted = Some(parsed.exp == "yes");
            }
            SearchSyntax::HasAccepted => {
                filter.scope = SearchScope::Question;
                filter.has_accepted = Some(parsed.exp == "yes");
            }
            SearchSyntax::IsQuestion => filter.scope = SearchScope::Question,
            SearchSyntax::IsAnswer => filter.scope = SearchScope::Answer,
            SearchSyntax::Quote => filter.phrase = Some(parsed.exp.clone()),
            SearchSyntax::Object => {}
        }

        Ok(Some(filter))
    }

    async fn resolve_author(
        &self,
        name: &str,
        current_user_id: Option<&str>,
    ) -> Result<Option<String>> {
        if name.eq_ignore_ascii_case(CURRENT_USER_ALIAS) {
            return Ok(current_user_id
                .filter(|id| !id.is_empty())
                .map(str::to_string));
        }

        let user = self.user_repo.get_user_by_username(name).await?;
        Ok(user.map(|u| u.id))
    }
}

fn parse_number(exp: &str) -> Result<i64> {
    exp.parse()
        .map_err(|_| ServiceError::Validation(format!("无效的数值: {exp}")))
}
