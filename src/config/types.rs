use super::validation::{ValidationError, ValidationUtils, Validator};
use serde::{Deserialize, Serialize};

/// Redis配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL (例如: "redis://localhost:6379")
    pub url: String,
    /// 連接池大小
    pub pool_size: u32,
    /// 連接超時（秒）
    pub connection_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            pool_size: 8,
            connection_timeout_secs: 5,
        }
    }
}

impl RedisConfig {
    /// 使用指定的伺服器地址建立配置，其餘欄位採用預設值
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Validator for RedisConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // 驗證Redis配置
        ValidationUtils::not_empty(&self.url, "redis.url")?;
        ValidationUtils::in_range(self.pool_size, 1, 100, "redis.pool_size")?;
        ValidationUtils::in_range(
            self.connection_timeout_secs,
            1,
            60,
            "redis.connection_timeout_secs",
        )?;

        Ok(())
    }
}
