//! 问答社区 API 服务

use std::sync::Arc;

use answer_api::{
    routes,
    state::Components,
};
use answer_shared::{
    cache::Cache,
    config::AppConfig,
    database::Database,
    event_queue::EventQueue,
    observability,
};
use axum::{
    Json,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("answer-server")?;
    config.validate()?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting answer-server on {}", config.server_addr());

    let db = Database::connect(&config.database).await?;
    db.run_migrations().await?;

    // Redis 不可用时配置项直接读库
    let cache = match Cache::new(&config.redis) {
        Ok(cache) => Some(Arc::new(cache)),
        Err(e) => {
            warn!(error = %e, "Redis 客户端创建失败，配置缓存已禁用");
            None
        }
    };

    let components = Components::build(db.pool(), cache.clone(), &config);
    let (events, event_worker) =
        EventQueue::start(&config.event_queue, components.event_handlers.clone());
    let state = components.into_state(events, &config);

    let app = routes::build_router(state)
        .route(
            "/ready",
            get({
                let db = db.clone();
                let cache = cache.clone();
                move || readiness_check(db.clone(), cache.clone())
            }),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer(&config.server.cors_origins));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Router 释放后队列发送端全部 drop，worker 处理完剩余事件后退出
    if let Err(e) = event_worker.await {
        warn!(error = %e, "事件队列 worker 异常退出");
    }
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// 按 `server.cors_origins` 构造 CORS，`*` 表示允许任意来源
fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    response
}

/// 监听 Ctrl+C 和 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 就绪探针：检查数据库和 Redis
async fn readiness_check(db: Database, cache: Option<Arc<Cache>>) -> Json<serde_json::Value> {
    let pool = db.health_check().await.ok();
    let db_ok = pool.is_some();
    let cache_status = match cache {
        Some(cache) if cache.health_check().await.is_ok() => "ok",
        Some(_) => "fail",
        None => "disabled",
    };
    let all_ok = db_ok && cache_status != "fail";

    Json(serde_json::json!({
        "status": if all_ok { "ok" } else { "degraded" },
        "service": "answer-server",
        "checks": {
            "database": if db_ok { "ok" } else { "fail" },
            "redis": cache_status
        },
        "pool": pool.map(|p| serde_json::json!({
            "size": p.size,
            "idle": p.idle,
            "inUse": p.in_use()
        }))
    }))
}
