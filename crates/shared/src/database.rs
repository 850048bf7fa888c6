//! PostgreSQL 连接池
//!
//! 负责建池、执行 `migrations/` 下的表结构迁移，并把连接池占用情况上报为指标。

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::config::DatabaseConfig;
use crate::error::{AnswerError, Result};
use crate::observability::metrics::record_db_pool;

/// 编译期嵌入的迁移脚本
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// 连接池占用快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// 已建立的连接数（含空闲）
    pub size: u32,
    pub idle: u32,
}

impl PoolStats {
    pub fn in_use(&self) -> u32 {
        self.size.saturating_sub(self.idle)
    }
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 建立连接池，日志只记录主机、端口和库名
    #[instrument(skip(config))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::from_str(&config.url)?;
        info!(
            host = options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or_default(),
            max_connections = config.max_connections,
            "连接问答库"
        );

        let pool = pool_options(config).connect_with(options).await?;
        let db = Self { pool };
        db.report_pool();

        Ok(db)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: u32::try_from(self.pool.num_idle()).unwrap_or(u32::MAX),
        }
    }

    /// 连通性检查，同时刷新连接池指标
    pub async fn health_check(&self) -> Result<PoolStats> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(self.report_pool())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("问答库连接池已关闭");
    }

    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| AnswerError::Internal(format!("迁移失败: {e}")))?;
        info!(migrations = MIGRATOR.iter().count(), "表结构迁移完成");
        Ok(())
    }

    fn report_pool(&self) -> PoolStats {
        let stats = self.stats();
        record_db_pool(stats.size, stats.idle);
        stats
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_embedded() {
        assert!(MIGRATOR.iter().any(|m| m.description == "init"));
    }

    #[test]
    fn test_pool_stats_in_use() {
        assert_eq!(PoolStats { size: 5, idle: 2 }.in_use(), 3);
        assert_eq!(PoolStats { size: 0, idle: 0 }.in_use(), 0);
    }

    #[tokio::test]
    async fn test_lazy_pool_starts_empty() {
        let config = DatabaseConfig {
            min_connections: 0,
            ..Default::default()
        };
        let pool = pool_options(&config)
            .connect_lazy_with(PgConnectOptions::from_str(&config.url).unwrap());
        let db = Database { pool };

        assert_eq!(db.report_pool(), PoolStats { size: 0, idle: 0 });
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let config = DatabaseConfig {
            url: "not a url".to_string(),
            ..Default::default()
        };
        let err = Database::connect(&config).await.err().unwrap();
        assert_eq!(err.code(), "DATABASE_ERROR");
    }

    #[tokio::test]
    #[ignore] // 需要数据库连接
    async fn test_database_connection() {
        let config = DatabaseConfig {
            url: std::env::var("DATABASE_URL").unwrap_or_else(|_| DatabaseConfig::default().url),
            ..Default::default()
        };
        let db = Database::connect(&config).await.unwrap();
        db.run_migrations().await.unwrap();
        let stats = db.health_check().await.unwrap();
        assert!(stats.size >= 1);
    }
}
