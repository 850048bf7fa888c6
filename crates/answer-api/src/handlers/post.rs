//! 提问、回答、评论的发布与编辑
//!
//! 发布只判定声望（不涉及具体对象），编辑按对象判定，作者本人总是可以编辑。

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use answer_service::{Action, NewAnswer, NewComment, NewQuestion, ObjectType};
use answer_shared::events::{EventMsg, EventType};
use tracing::info;
use validator::Validate;

use super::{ensure_permission, load_object, object_event, publish};
use crate::auth::RequestContext;
use crate::dto::{
    AddAnswerRequest, AddCommentRequest, ApiResponse, CreatedResponse, QuestionRequest,
    UpdateAnswerRequest,
};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 提问
///
/// POST /answer/api/v1/question
pub async fn add_question(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: std::result::Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<ApiResponse<CreatedResponse>> {
    let Json(req) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    req.validate()?;
    let user = ctx.require_user()?;
    ensure_permission(&state, &user.user_id, Action::QuestionAdd, "").await?;

    let id = state
        .content_repo
        .create_question(&NewQuestion {
            user_id: user.user_id.clone(),
            title: req.title,
            content: req.content,
        })
        .await?;
    info!(question_id = %id, user_id = %user.user_id, "问题已发布");

    publish(
        &state,
        EventMsg::new(EventType::QuestionCreate, user.user_id.as_str())
            .with_question(id.clone(), Some(user.user_id.clone())),
    )
    .await;

    Ok(ApiResponse::success(CreatedResponse { id }))
}

/// 编辑问题
///
/// PUT /answer/api/v1/question/{id}
pub async fn update_question(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    body: std::result::Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<ApiResponse<()>> {
    let Json(req) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    req.validate()?;
    let user = ctx.require_user()?;
    let question = load_object(&state, &id, ObjectType::Question).await?;
    ensure_permission(&state, &user.user_id, Action::QuestionEdit, &id).await?;

    state
        .content_repo
        .update_question(&id, &req.title, &req.content)
        .await?;

    publish(
        &state,
        EventMsg::new(EventType::QuestionUpdate, user.user_id.as_str())
            .with_question(id, Some(question.object_creator_user_id)),
    )
    .await;

    Ok(ApiResponse::success_empty())
}

/// 回答问题
///
/// POST /answer/api/v1/answer
pub async fn add_answer(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: std::result::Result<Json<AddAnswerRequest>, JsonRejection>,
) -> Result<ApiResponse<CreatedResponse>> {
    let Json(req) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    req.validate()?;
    let user = ctx.require_user()?;
    let question = load_object(&state, &req.question_id, ObjectType::Question).await?;
    ensure_permission(&state, &user.user_id, Action::AnswerAdd, "").await?;

    let id = state
        .content_repo
        .create_answer(&NewAnswer {
            question_id: req.question_id.clone(),
            user_id: user.user_id.clone(),
            content: req.content,
        })
        .await?;
    info!(question_id = %req.question_id, answer_id = %id, "回答已发布");

    publish(
        &state,
        EventMsg::new(EventType::AnswerCreate, user.user_id.as_str())
            .with_question(req.question_id, Some(question.object_creator_user_id))
            .with_answer(id.clone(), Some(user.user_id.clone())),
    )
    .await;

    Ok(ApiResponse::success(CreatedResponse { id }))
}

/// 编辑回答
///
/// PUT /answer/api/v1/answer/{id}
pub async fn update_answer(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    body: std::result::Result<Json<UpdateAnswerRequest>, JsonRejection>,
) -> Result<ApiResponse<()>> {
    let Json(req) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    req.validate()?;
    let user = ctx.require_user()?;
    let answer = load_object(&state, &id, ObjectType::Answer).await?;
    ensure_permission(&state, &user.user_id, Action::AnswerEdit, &id).await?;

    state.content_repo.update_answer(&id, &req.content).await?;

    if let Some(event) = object_event(EventType::AnswerUpdate, &user.user_id, answer) {
        publish(&state, event).await;
    }

    Ok(ApiResponse::success_empty())
}

/// 评论问题或回答
///
/// POST /answer/api/v1/comment
pub async fn add_comment(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: std::result::Result<Json<AddCommentRequest>, JsonRejection>,
) -> Result<ApiResponse<CreatedResponse>> {
    let Json(req) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    req.validate()?;
    let user = ctx.require_user()?;

    let target = match ObjectType::from_object_id(&req.object_id) {
        Some(object_type @ (ObjectType::Question | ObjectType::Answer)) => {
            load_object(&state, &req.object_id, object_type).await?
        }
        _ => return Err(ApiError::NotFound(format!("{} 不可评论", req.object_id))),
    };
    let question_id = match target.object_type {
        ObjectType::Question => target.object_id.clone(),
        _ => target
            .question_id
            .clone()
            .ok_or_else(|| ApiError::NotFound(format!("回答 {} 没有所属问题", target.object_id)))?,
    };
    ensure_permission(&state, &user.user_id, Action::CommentAdd, "").await?;

    let id = state
        .content_repo
        .create_comment(&NewComment {
            user_id: user.user_id.clone(),
            object_id: req.object_id,
            question_id,
            content: req.content,
        })
        .await?;

    if let Some(event) = object_event(EventType::CommentCreate, &user.user_id, target) {
        publish(
            &state,
            event.with_comment(id.clone(), Some(user.user_id.clone())),
        )
        .await;
    }

    Ok(ApiResponse::success(CreatedResponse { id }))
}
