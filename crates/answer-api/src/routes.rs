//! 路由配置
//!
//! 业务接口挂在 `/answer/api/v1` 下。

use axum::{
    Json, Router, middleware,
    routing::{delete, get, post, put},
};
use answer_shared::observability::middleware as obs_middleware;

use crate::{handlers, middleware::auth_middleware, state::AppState};

pub const API_PREFIX: &str = "/answer/api/v1";

/// 内容发布、管理与投票路由
fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/question", post(handlers::post::add_question))
        .route(
            "/question/{id}",
            put(handlers::post::update_question).delete(handlers::content::delete_question),
        )
        .route(
            "/question/{id}/status",
            put(handlers::content::update_question_status),
        )
        .route("/question/{id}/pin", put(handlers::content::pin_question))
        .route("/answer", post(handlers::post::add_answer))
        .route(
            "/answer/{id}",
            put(handlers::post::update_answer).delete(handlers::content::delete_answer),
        )
        .route(
            "/answer/{id}/accept",
            post(handlers::content::accept_answer),
        )
        .route("/comment", post(handlers::post::add_comment))
        .route("/comment/{id}", delete(handlers::content::delete_comment))
        .route("/report", post(handlers::report::add_report))
        .route("/vote/up", post(handlers::vote::vote_up))
        .route("/vote/down", post(handlers::vote::vote_down))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/permission", get(handlers::permission::get_permission))
        .route("/search", get(handlers::search::search))
        .route("/badges", get(handlers::badge::list_badges))
        .route("/badge/awards", get(handlers::badge::list_user_awards))
        .merge(content_routes())
}

/// 组装完整的应用路由（不含 CORS 和就绪探针，由 main 追加）
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, api_routes())
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 存活探针
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "answer-server"
    }))
}
