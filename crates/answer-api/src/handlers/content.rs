//! 问题、回答、评论的管理操作

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use answer_service::{Action, ObjectType, QuestionStatus};
use answer_shared::events::{EventMsg, EventType};
use tracing::info;

use super::{ensure_permission, load_object, publish};
use crate::auth::RequestContext;
use crate::dto::{ApiResponse, PinQuestionRequest, UpdateQuestionStatusRequest};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 删除问题
///
/// DELETE /answer/api/v1/question/{id}
pub async fn delete_question(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    let user = ctx.require_user()?;
    let question = load_object(&state, &id, ObjectType::Question).await?;
    ensure_permission(&state, &user.user_id, Action::QuestionDelete, &id).await?;

    state.content_repo.delete_question(&id).await?;
    info!(question_id = %id, user_id = %user.user_id, "问题已删除");

    publish(
        &state,
        EventMsg::new(EventType::QuestionDelete, user.user_id.as_str())
            .with_question(id, Some(question.object_creator_user_id)),
    )
    .await;

    Ok(ApiResponse::success_empty())
}

/// 关闭或重新打开问题
///
/// PUT /answer/api/v1/question/{id}/status
pub async fn update_question_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    body: std::result::Result<Json<UpdateQuestionStatusRequest>, JsonRejection>,
) -> Result<ApiResponse<()>> {
    let Json(req) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    let user = ctx.require_user()?;

    let (action, event_type) = match req.status {
        QuestionStatus::Closed => (Action::QuestionClose, EventType::QuestionClose),
        QuestionStatus::Open => (Action::QuestionReopen, EventType::QuestionReopen),
        QuestionStatus::Deleted => {
            return Err(ApiError::Validation("删除问题请使用 DELETE 接口".to_string()));
        }
    };

    let question = load_object(&state, &id, ObjectType::Question).await?;
    ensure_permission(&state, &user.user_id, action, &id).await?;

    state.content_repo.update_question_status(&id, req.status).await?;
    info!(question_id = %id, status = ?req.status, "问题状态已更新");

    publish(
        &state,
        EventMsg::new(event_type, user.user_id.as_str())
            .with_question(id, Some(question.object_creator_user_id)),
    )
    .await;

    Ok(ApiResponse::success_empty())
}

/// 置顶或取消置顶
///
/// PUT /answer/api/v1/question/{id}/pin
pub async fn pin_question(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    body: std::result::Result<Json<PinQuestionRequest>, JsonRejection>,
) -> Result<ApiResponse<()>> {
    let Json(req) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    let user = ctx.require_user()?;

    let (action, event_type) = if req.pinned {
        (Action::QuestionPin, EventType::QuestionPin)
    } else {
        (Action::QuestionUnpin, EventType::QuestionUnpin)
    };

    let question = load_object(&state, &id, ObjectType::Question).await?;
    ensure_permission(&state, &user.user_id, action, &id).await?;

    state.content_repo.set_question_pinned(&id, req.pinned).await?;

    publish(
        &state,
        EventMsg::new(event_type, user.user_id.as_str())
            .with_question(id, Some(question.object_creator_user_id)),
    )
    .await;

    Ok(ApiResponse::success_empty())
}

/// 删除回答
///
/// DELETE /answer/api/v1/answer/{id}
pub async fn delete_answer(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    let user = ctx.require_user()?;
    let answer = load_object(&state, &id, ObjectType::Answer).await?;
    ensure_permission(&state, &user.user_id, Action::AnswerDelete, &id).await?;

    state.content_repo.delete_answer(&id).await?;
    info!(answer_id = %id, user_id = %user.user_id, "回答已删除");

    let mut event = EventMsg::new(EventType::AnswerDelete, user.user_id.as_str());
    if let Some(question_id) = answer.question_id {
        event = event.with_question(question_id, None);
    }
    publish(
        &state,
        event.with_answer(id, Some(answer.object_creator_user_id)),
    )
    .await;

    Ok(ApiResponse::success_empty())
}

/// 采纳回答
///
/// POST /answer/api/v1/answer/{id}/accept
///
/// 权限按所属问题判定，问题作者总是可以采纳。
pub async fn accept_answer(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    let user = ctx.require_user()?;
    let answer = load_object(&state, &id, ObjectType::Answer).await?;
    let question_id = answer
        .question_id
        .clone()
        .ok_or_else(|| ApiError::NotFound(format!("回答 {id} 没有所属问题")))?;
    let question = load_object(&state, &question_id, ObjectType::Question).await?;

    ensure_permission(&state, &user.user_id, Action::AnswerAccept, &question_id).await?;

    state.content_repo.accept_answer(&question_id, &id).await?;
    info!(question_id = %question_id, answer_id = %id, "回答已采纳");

    publish(
        &state,
        EventMsg::new(EventType::AnswerAccept, user.user_id.as_str())
            .with_question(question_id, Some(question.object_creator_user_id))
            .with_answer(id, Some(answer.object_creator_user_id)),
    )
    .await;

    Ok(ApiResponse::success_empty())
}

/// 删除评论
///
/// DELETE /answer/api/v1/comment/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    let user = ctx.require_user()?;
    let comment = load_object(&state, &id, ObjectType::Comment).await?;
    ensure_permission(&state, &user.user_id, Action::CommentDelete, &id).await?;

    state.content_repo.delete_comment(&id).await?;

    let mut event = EventMsg::new(EventType::CommentDelete, user.user_id.as_str());
    if let Some(question_id) = comment.question_id {
        event = event.with_question(question_id, None);
    }
    publish(
        &state,
        event.with_comment(id, Some(comment.object_creator_user_id)),
    )
    .await;

    Ok(ApiResponse::success_empty())
}
