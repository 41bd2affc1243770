use async_trait::async_trait;
use deadpool_redis::redis::{cmd, AsyncCommands, RedisError};
use deadpool_redis::Connection;
use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::redis::pool::{RedisPool, RedisPoolError};

/// SCAN每批次掃描的鍵數量
const SCAN_BATCH_SIZE: usize = 100;

/// 將TTL安全轉換為EXPIRE所需的i64，超出範圍時取上限而非回繞為負數
fn clamp_ttl(ttl_secs: u64) -> i64 {
    i64::try_from(ttl_secs).unwrap_or(i64::MAX)
}

/// 快取操作錯誤
#[derive(Error, Debug)]
pub enum CacheError {
    /// Redis連接錯誤
    #[error("Redis連接錯誤: {0}")]
    ConnectionError(#[from] RedisPoolError),

    /// Redis操作錯誤
    #[error("Redis操作錯誤: {0}")]
    RedisError(#[from] RedisError),

    /// 序列化錯誤
    #[error("數據序列化錯誤: {0}")]
    SerializationError(String),

    /// 反序列化錯誤
    #[error("數據反序列化錯誤: {0}")]
    DeserializationError(String),

    /// 其他錯誤
    #[error("快取操作其他錯誤: {0}")]
    Other(String),
}

/// 快取操作接口
///
/// 鍵不存在一律以 `None`/`false` 表示，不視為錯誤。
#[async_trait]
pub trait CacheOperations: Send + Sync + 'static {
    /// 以JSON格式存儲值到快取，可選過期時間（秒）
    async fn set<K, V>(&self, key: K, value: &V, ttl_secs: Option<u64>) -> Result<(), CacheError>
    where
        K: AsRef<str> + Send + Sync,
        V: Serialize + Send + Sync;

    /// 存儲原始字串到快取（不經JSON編碼），可選過期時間（秒）
    async fn set_string<K, V>(
        &self,
        key: K,
        value: V,
        ttl_secs: Option<u64>,
    ) -> Result<(), CacheError>
    where
        K: AsRef<str> + Send + Sync,
        V: AsRef<str> + Send + Sync;

    /// 從快取獲取值並以JSON解碼；鍵不存在時返回None
    async fn get<K, V>(&self, key: K) -> Result<Option<V>, CacheError>
    where
        K: AsRef<str> + Send + Sync,
        V: DeserializeOwned + Send + Sync;

    /// 從快取獲取原始字串；鍵不存在時返回None
    async fn get_string<K>(&self, key: K) -> Result<Option<String>, CacheError>
    where
        K: AsRef<str> + Send + Sync;

    /// 檢查快取中是否存在鍵
    async fn exists<K>(&self, key: K) -> Result<bool, CacheError>
    where
        K: AsRef<str> + Send + Sync;

    /// 從快取中刪除鍵；鍵不存在時同樣視為成功（冪等）
    async fn delete<K>(&self, key: K) -> Result<(), CacheError>
    where
        K: AsRef<str> + Send + Sync;

    /// 設置鍵的過期時間；鍵不存在時返回false
    async fn expire<K>(&self, key: K, ttl_secs: u64) -> Result<bool, CacheError>
    where
        K: AsRef<str> + Send + Sync;

    /// 以glob模式搜索鍵（SCAN遍歷，不阻塞伺服器），結果無順序保證
    async fn search_keys<K>(&self, pattern: K) -> Result<Vec<String>, CacheError>
    where
        K: AsRef<str> + Send + Sync;

    /// 以glob模式搜索鍵並併發獲取對應的原始字串值
    async fn search_key_values<K>(&self, pattern: K) -> Result<HashMap<String, String>, CacheError>
    where
        K: AsRef<str> + Send + Sync;

    /// 以glob模式搜索鍵並併發獲取對應的值（JSON解碼）
    async fn search_key_values_typed<K, V>(
        &self,
        pattern: K,
    ) -> Result<HashMap<String, V>, CacheError>
    where
        K: AsRef<str> + Send + Sync,
        V: DeserializeOwned + Send + Sync;
}

/// 快取操作實現
///
/// 每個操作從連接池獲取一個連接，操作結束時連接自動歸還連接池。
pub struct CacheManager<P: RedisPool> {
    pool: P,
}

impl<P: RedisPool> CacheManager<P> {
    /// 創建新的快取管理器
    pub fn new(pool: P) -> Self {
        Self { pool }
    }

    /// 從連接池獲取連接
    pub(crate) async fn conn(&self) -> Result<Connection, CacheError> {
        let conn = self.pool.get_conn().await?;
        Ok(conn)
    }

    /// 寫入鍵值，可選過期時間
    async fn write_value(
        &self,
        key: &str,
        payload: &str,
        ttl_secs: Option<u64>,
    ) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;

        let result = if let Some(ttl) = ttl_secs {
            // 設置帶TTL的值
            cmd("SET")
                .arg(key)
                .arg(payload)
                .arg("EX")
                .arg(ttl)
                .query_async::<()>(&mut conn)
                .await
        } else {
            // 設置不帶TTL的值
            conn.set::<_, _, ()>(key, payload).await
        };

        match result {
            Ok(_) => {
                debug!("快取設置成功: {}", key);
                Ok(())
            }
            Err(e) => {
                error!("快取設置失敗 [{}]: {}", key, e);
                Err(CacheError::RedisError(e))
            }
        }
    }
}

#[async_trait]
impl<P: RedisPool> CacheOperations for CacheManager<P> {
    async fn set<K, V>(&self, key: K, value: &V, ttl_secs: Option<u64>) -> Result<(), CacheError>
    where
        K: AsRef<str> + Send + Sync,
        V: Serialize + Send + Sync,
    {
        // 序列化值
        let serialized = serde_json::to_string(value)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        self.write_value(key.as_ref(), &serialized, ttl_secs).await
    }

    async fn set_string<K, V>(
        &self,
        key: K,
        value: V,
        ttl_secs: Option<u64>,
    ) -> Result<(), CacheError>
    where
        K: AsRef<str> + Send + Sync,
        V: AsRef<str> + Send + Sync,
    {
        // 字串不經JSON編碼，直接存儲
        self.write_value(key.as_ref(), value.as_ref(), ttl_secs)
            .await
    }

    async fn get<K, V>(&self, key: K) -> Result<Option<V>, CacheError>
    where
        K: AsRef<str> + Send + Sync,
        V: DeserializeOwned + Send + Sync,
    {
        match self.get_string(key.as_ref()).await? {
            Some(value) => match serde_json::from_str(&value) {
                Ok(deserialized) => Ok(Some(deserialized)),
                Err(e) => {
                    warn!("快取值反序列化失敗 [{}]: {}", key.as_ref(), e);
                    Err(CacheError::DeserializationError(e.to_string()))
                }
            },
            None => Ok(None),
        }
    }

    async fn get_string<K>(&self, key: K) -> Result<Option<String>, CacheError>
    where
        K: AsRef<str> + Send + Sync,
    {
        let mut conn = self.conn().await?;

        match conn.get::<_, Option<String>>(key.as_ref()).await {
            Ok(Some(value)) => {
                debug!("快取命中: {}", key.as_ref());
                Ok(Some(value))
            }
            Ok(None) => {
                debug!("快取未命中: {}", key.as_ref());
                Ok(None)
            }
            Err(e) => {
                error!("快取讀取失敗 [{}]: {}", key.as_ref(), e);
                Err(CacheError::RedisError(e))
            }
        }
    }

    async fn exists<K>(&self, key: K) -> Result<bool, CacheError>
    where
        K: AsRef<str> + Send + Sync,
    {
        let mut conn = self.conn().await?;

        match conn.exists::<_, bool>(key.as_ref()).await {
            Ok(exists) => Ok(exists),
            Err(e) => {
                error!("快取鍵檢查失敗 [{}]: {}", key.as_ref(), e);
                Err(CacheError::RedisError(e))
            }
        }
    }

    async fn delete<K>(&self, key: K) -> Result<(), CacheError>
    where
        K: AsRef<str> + Send + Sync,
    {
        let mut conn = self.conn().await?;

        // DEL對不存在的鍵返回0，同樣視為成功
        match conn.del::<_, u64>(key.as_ref()).await {
            Ok(deleted) => {
                debug!(
                    "快取刪除 {}: {}",
                    key.as_ref(),
                    if deleted > 0 { "成功" } else { "鍵不存在" }
                );
                Ok(())
            }
            Err(e) => {
                error!("快取刪除失敗 [{}]: {}", key.as_ref(), e);
                Err(CacheError::RedisError(e))
            }
        }
    }

    async fn expire<K>(&self, key: K, ttl_secs: u64) -> Result<bool, CacheError>
    where
        K: AsRef<str> + Send + Sync,
    {
        let mut conn = self.conn().await?;

        match conn
            .expire::<_, bool>(key.as_ref(), clamp_ttl(ttl_secs))
            .await
        {
            Ok(set) => {
                debug!(
                    "快取過期時間設置 {}: {} ({}秒)",
                    key.as_ref(),
                    if set { "成功" } else { "鍵不存在" },
                    ttl_secs
                );
                Ok(set)
            }
            Err(e) => {
                error!("快取過期時間設置失敗 [{}]: {}", key.as_ref(), e);
                Err(CacheError::RedisError(e))
            }
        }
    }

    async fn search_keys<K>(&self, pattern: K) -> Result<Vec<String>, CacheError>
    where
        K: AsRef<str> + Send + Sync,
    {
        let mut conn = self.conn().await?;
        // SCAN在伺服器rehash期間可能重複返回同一個鍵，以集合去重
        let mut seen = HashSet::new();
        let mut cursor: u64 = 0;

        // 使用SCAN遍歷而非KEYS，避免阻塞伺服器
        loop {
            let (next_cursor, batch): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern.as_ref())
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    error!("鍵搜索失敗 [{}]: {}", pattern.as_ref(), e);
                    CacheError::RedisError(e)
                })?;

            seen.extend(batch);
            cursor = next_cursor;

            if cursor == 0 {
                break;
            }
        }

        let keys: Vec<String> = seen.into_iter().collect();
        debug!("鍵搜索 [{}] 匹配 {} 個鍵", pattern.as_ref(), keys.len());
        Ok(keys)
    }

    async fn search_key_values<K>(&self, pattern: K) -> Result<HashMap<String, String>, CacheError>
    where
        K: AsRef<str> + Send + Sync,
    {
        let keys = self.search_keys(pattern.as_ref()).await?;

        // 每個鍵併發發出一個GET請求，等待全部完成後聚合
        let fetches = keys.iter().map(|key| async move {
            let value = self.get_string(key.as_str()).await;
            (key.clone(), value)
        });

        let mut values = HashMap::with_capacity(keys.len());
        for (key, result) in join_all(fetches).await {
            match result {
                Ok(Some(value)) => {
                    values.insert(key, value);
                }
                // 鍵在SCAN與GET之間過期或被刪除
                Ok(None) => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(values)
    }

    async fn search_key_values_typed<K, V>(
        &self,
        pattern: K,
    ) -> Result<HashMap<String, V>, CacheError>
    where
        K: AsRef<str> + Send + Sync,
        V: DeserializeOwned + Send + Sync,
    {
        let raw = self.search_key_values(pattern).await?;

        let mut values = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let deserialized = serde_json::from_str(&value).map_err(|e| {
                warn!("快取值反序列化失敗 [{}]: {}", key, e);
                CacheError::DeserializationError(e.to_string())
            })?;
            values.insert(key, deserialized);
        }

        Ok(values)
    }
}
