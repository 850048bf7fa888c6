//! 徽章查询

use axum::extract::{Query, State, rejection::QueryRejection};
use answer_service::{Badge, BadgeAward};

use crate::auth::RequestContext;
use crate::dto::{ApiResponse, UserAwardsQuery};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 启用中的徽章列表
///
/// GET /answer/api/v1/badges
pub async fn list_badges(State(state): State<AppState>) -> Result<ApiResponse<Vec<Badge>>> {
    let badges = state.badge_service.list_badges().await?;
    Ok(ApiResponse::success(badges))
}

/// 用户获得的徽章
///
/// GET /answer/api/v1/badge/awards?userId=...，不传 userId 时查询当前用户
pub async fn list_user_awards(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: std::result::Result<Query<UserAwardsQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<BadgeAward>>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;

    let user_id = match query.user_id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => ctx.require_user()?.user_id.clone(),
    };

    let awards = state.badge_service.list_user_awards(&user_id).await?;
    Ok(ApiResponse::success(awards))
}
