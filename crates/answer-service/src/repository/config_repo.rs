//! 站点配置仓储
//!
//! 读取 `config` 表中的键值配置，可选 Redis 旁路缓存。

use std::sync::Arc;
use std::time::Duration;

use answer_shared::cache::Cache;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};

use super::traits::ConfigRepositoryTrait;
use crate::error::Result;

const CACHE_PREFIX: &str = "answer:config:";

pub struct ConfigRepository {
    pool: PgPool,
    cache: Option<Arc<Cache>>,
    ttl: Duration,
}

impl ConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: None,
            ttl: Duration::from_secs(300),
        }
    }

    /// 启用缓存；缓存故障时退回数据库读取
    pub fn with_cache(mut self, cache: Arc<Cache>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.ttl = ttl;
        self
    }

    async fn load_value(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT value FROM config WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }
}

fn parse_int(key: &str, raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = raw, "配置值不是整数");
            None
        }
    }
}

#[async_trait]
impl ConfigRepositoryTrait for ConfigRepository {
    async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        let cache_key = format!("{CACHE_PREFIX}{key}");

        if let Some(cache) = &self.cache {
            match cache.get::<i64>(&cache_key).await {
                Ok(Some(v)) => {
                    debug!(key, "配置缓存命中");
                    return Ok(Some(v));
                }
                Ok(None) => {}
                Err(e) => warn!(key, error = %e, "读取配置缓存失败"),
            }
        }

        let value = self
            .load_value(key)
            .await?
            .and_then(|raw| parse_int(key, &raw));

        if let (Some(cache), Some(v)) = (&self.cache, value) {
            if let Err(e) = cache.set(&cache_key, &v, self.ttl).await {
                warn!(key, error = %e, "写入配置缓存失败");
            }
        }

        Ok(value)
    }
}
