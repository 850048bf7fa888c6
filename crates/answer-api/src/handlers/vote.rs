//! 投票

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use answer_service::VoteResult;
use answer_shared::events::EventType;
use validator::Validate;

use super::{object_event, publish};
use crate::auth::RequestContext;
use crate::dto::{ApiResponse, VoteRequest};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// POST /answer/api/v1/vote/up
pub async fn vote_up(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: std::result::Result<Json<VoteRequest>, JsonRejection>,
) -> Result<ApiResponse<VoteResult>> {
    vote(state, ctx, body, true).await
}

/// POST /answer/api/v1/vote/down
pub async fn vote_down(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: std::result::Result<Json<VoteRequest>, JsonRejection>,
) -> Result<ApiResponse<VoteResult>> {
    vote(state, ctx, body, false).await
}

async fn vote(
    state: AppState,
    ctx: RequestContext,
    body: std::result::Result<Json<VoteRequest>, JsonRejection>,
    up: bool,
) -> Result<ApiResponse<VoteResult>> {
    let Json(req) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    req.validate()?;
    let user = ctx.require_user()?;

    let object = state.object_repo.get_info(&req.object_id).await?;
    if object.is_created_by(&user.user_id) {
        return Err(ApiError::Forbidden("不能给自己的内容投票".to_string()));
    }

    if !state
        .rank_service
        .check_vote_permission(&user.user_id, &object, up)
        .await?
    {
        return Err(ApiError::RankNotMet { required: None });
    }

    let result = state
        .content_repo
        .record_vote(&user.user_id, &object, up)
        .await?;

    // 撤销投票不产生事件
    if result.user_vote != 0 {
        let event_type = if up {
            EventType::VoteUp
        } else {
            EventType::VoteDown
        };
        if let Some(event) = object_event(event_type, &user.user_id, object) {
            publish(&state, event).await;
        }
    }

    Ok(ApiResponse::success(result))
}
