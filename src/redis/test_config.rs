//! 集中化的 Redis 測試配置
//!
//! 提供一致的測試環境配置。無Redis環境可用時測試自動跳過，
//! 可透過 REDIS_TEST_URL 環境變數覆寫測試目標伺服器地址。

use crate::config::types::RedisConfig;
use crate::redis::pool::{ConnectionPool, RedisPool, RedisPoolError};
use std::sync::Arc;

/// Redis 測試配置建構器
pub struct RedisTestConfig;

impl RedisTestConfig {
    /// 獲取測試用 Redis URL
    ///
    /// 優先級：
    /// 1. REDIS_TEST_URL 環境變數
    /// 2. 預設 localhost:6379
    pub fn get_test_url() -> String {
        std::env::var("REDIS_TEST_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// 建立標準測試 Redis 配置
    pub fn create_test_config() -> RedisConfig {
        RedisConfig {
            url: Self::get_test_url(),
            pool_size: 3,
            connection_timeout_secs: 5,
        }
    }

    /// 建立測試用 Redis 連接池
    pub async fn create_test_pool() -> Result<Arc<ConnectionPool>, RedisPoolError> {
        let config = Self::create_test_config();
        let pool = ConnectionPool::new(config).await?;
        Ok(Arc::new(pool))
    }

    /// 檢查 Redis 是否可用於測試
    pub async fn is_redis_available() -> bool {
        match Self::create_test_pool().await {
            Ok(pool) => pool.check_health().await,
            Err(_) => false,
        }
    }

    /// 若 Redis 環境可用則返回測試連接池，否則返回 None 讓測試跳過
    pub async fn skip_if_redis_unavailable(test_name: &str) -> Option<Arc<ConnectionPool>> {
        match Self::create_test_pool().await {
            Ok(pool) if pool.check_health().await => Some(pool),
            _ => {
                println!("跳過Redis測試 '{}' - 無Redis環境可用", test_name);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_test_url_default() {
        if std::env::var("REDIS_TEST_URL").is_err() {
            assert_eq!(RedisTestConfig::get_test_url(), "redis://localhost:6379");
        }
    }

    #[test]
    fn test_create_test_config() {
        let config = RedisTestConfig::create_test_config();
        assert!(config.url.starts_with("redis://"));
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.connection_timeout_secs, 5);
    }
}
