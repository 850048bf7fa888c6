//! 权限查询

use std::collections::BTreeMap;

use axum::extract::{Query, State, rejection::QueryRejection};
use validator::Validate;

use crate::auth::RequestContext;
use crate::dto::{ApiResponse, PermissionQuery};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 批量查询当前用户的操作权限
///
/// GET /answer/api/v1/permission?action=question.edit,question.delete&objectId=...
///
/// 匿名用户可以调用，结果全部为 false。
pub async fn get_permission(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: std::result::Result<Query<PermissionQuery>, QueryRejection>,
) -> Result<ApiResponse<BTreeMap<String, bool>>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    query.validate()?;
    let actions = query.actions()?;

    let allowed = state
        .rank_service
        .check_operation_permissions(ctx.user_id(), &actions, query.object_id())
        .await?;

    let result = actions
        .iter()
        .zip(allowed)
        .map(|(action, allowed)| (action.as_str().to_string(), allowed))
        .collect();

    Ok(ApiResponse::success(result))
}
