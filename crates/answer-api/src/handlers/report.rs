//! 举报

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use answer_service::{Action, NewReport, ObjectType};
use answer_shared::events::EventType;
use tracing::info;
use validator::Validate;

use super::{ensure_permission, object_event, publish};
use crate::auth::RequestContext;
use crate::dto::{AddReportRequest, ApiResponse};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 举报问题、回答或评论
///
/// POST /answer/api/v1/report
pub async fn add_report(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: std::result::Result<Json<AddReportRequest>, JsonRejection>,
) -> Result<ApiResponse<()>> {
    let Json(req) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    req.validate()?;
    let user = ctx.require_user()?;

    let object_type = match ObjectType::from_object_id(&req.object_id) {
        Some(t @ (ObjectType::Question | ObjectType::Answer | ObjectType::Comment)) => t,
        _ => return Err(ApiError::NotFound(format!("{} 不可举报", req.object_id))),
    };
    let object = state.object_repo.get_info(&req.object_id).await?;
    ensure_permission(&state, &user.user_id, Action::ReportAdd, "").await?;

    let report_id = state
        .content_repo
        .add_report(&NewReport {
            user_id: user.user_id.clone(),
            object_id: req.object_id,
            object_type,
            reason: req.reason,
        })
        .await?;
    info!(report_id, object_id = %object.object_id, "收到举报");

    if let Some(event) = object_event(EventType::ReportCreate, &user.user_id, object) {
        publish(&state, event).await;
    }

    Ok(ApiResponse::success_empty())
}
