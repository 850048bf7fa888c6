//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    describe_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册指标描述，出现在 /metrics 的 HELP 注释中
fn describe_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!(
        "permission_checks_total",
        "Total number of rank permission checks"
    );
    metrics::describe_counter!("events_enqueued_total", "Total number of events enqueued");
    metrics::describe_counter!(
        "events_dropped_total",
        "Total number of events dropped because the queue was full"
    );
    metrics::describe_counter!(
        "event_handler_failures_total",
        "Total number of failed event handler invocations"
    );
    metrics::describe_counter!("badge_awards_total", "Total number of badge awards");
    metrics::describe_counter!("search_queries_total", "Total number of search queries");
    metrics::describe_histogram!(
        "search_query_duration_seconds",
        "Search query duration in seconds"
    );

    metrics::describe_gauge!("db_pool_connections", "Open PostgreSQL pool connections");
    metrics::describe_gauge!("db_pool_idle_connections", "Idle PostgreSQL pool connections");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ============================================================================
// 指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录等级权限检查结果
#[inline]
pub fn record_permission_check(action: &str, allowed: bool) {
    metrics::counter!(
        "permission_checks_total",
        "action" => action.to_string(),
        "allowed" => allowed.to_string()
    )
    .increment(1);
}

/// 记录徽章授予
///
/// `outcome`：awarded / skipped
#[inline]
pub fn record_badge_award(handler: &str, outcome: &str) {
    metrics::counter!(
        "badge_awards_total",
        "handler" => handler.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 记录搜索请求
#[inline]
pub fn record_search_query(syntax: &str, duration_secs: f64) {
    metrics::counter!("search_queries_total", "syntax" => syntax.to_string()).increment(1);
    metrics::histogram!("search_query_duration_seconds", "syntax" => syntax.to_string())
        .record(duration_secs);
}

/// 记录连接池占用
#[inline]
pub fn record_db_pool(size: u32, idle: u32) {
    metrics::gauge!("db_pool_connections").set(f64::from(size));
    metrics::gauge!("db_pool_idle_connections").set(f64::from(idle));
}
