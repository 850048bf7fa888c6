//! 搜索

use axum::extract::{Query, State, rejection::QueryRejection};
use answer_service::SearchRequest;
use answer_service::search::SearchResponse;

use crate::auth::RequestContext;
use crate::dto::ApiResponse;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// GET /answer/api/v1/search?q=[rust] lifetime&page=1&size=20&order=relevance
pub async fn search(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: std::result::Result<Query<SearchRequest>, QueryRejection>,
) -> Result<ApiResponse<SearchResponse>> {
    let Query(req) = query.map_err(|e| ApiError::Validation(e.body_text()))?;

    let current_user = ctx.user.as_ref().map(|u| u.user_id.as_str());
    let response = state.search_service.search(&req, current_user).await?;

    Ok(ApiResponse::success(response))
}
