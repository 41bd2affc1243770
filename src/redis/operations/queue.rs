//! FIFO佇列操作
//!
//! 基於Redis列表實現的先進先出佇列。元素以JSON編碼從尾部推入（RPUSH），
//! 從頭部讀取（LPOP或LINDEX）。佇列鍵一律使用 `queue:` 前綴命名空間。

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::redis::operations::cache::{CacheError, CacheManager, CacheOperations};
use crate::redis::pool::RedisPool;

/// 佇列鍵命名空間前綴
const QUEUE_KEY_PREFIX: &str = "queue:";

/// 佇列讀取模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopMode {
    /// 讀取頭部元素但不移除
    Get,
    /// 讀取並移除頭部元素
    #[default]
    Delete,
}

/// 生成佇列完整鍵名
fn queue_key(queue_name: &str) -> String {
    format!("{}{}", QUEUE_KEY_PREFIX, queue_name)
}

/// 佇列操作接口
///
/// 佇列不存在一律以 `None`/`false` 表示，不視為錯誤。
#[async_trait]
pub trait QueueOperations: Send + Sync + 'static {
    /// 將一批元素以JSON編碼推入佇列尾部；佇列不存在時隱式創建
    async fn push_to_queue<Q, V>(&self, queue_name: Q, items: &[V]) -> Result<(), CacheError>
    where
        Q: AsRef<str> + Send + Sync,
        V: Serialize + Send + Sync;

    /// 從佇列頭部讀取原始字串元素；佇列為空或不存在時返回None
    async fn pop_from_queue<Q>(
        &self,
        queue_name: Q,
        mode: PopMode,
    ) -> Result<Option<String>, CacheError>
    where
        Q: AsRef<str> + Send + Sync;

    /// 從佇列頭部讀取元素並以JSON解碼；佇列為空或不存在時返回None
    async fn pop_from_queue_typed<Q, V>(
        &self,
        queue_name: Q,
        mode: PopMode,
    ) -> Result<Option<V>, CacheError>
    where
        Q: AsRef<str> + Send + Sync,
        V: DeserializeOwned + Send + Sync;

    /// 檢查佇列是否存在
    async fn queue_exists<Q>(&self, queue_name: Q) -> Result<bool, CacheError>
    where
        Q: AsRef<str> + Send + Sync;

    /// 刪除佇列；佇列不存在時同樣視為成功（冪等）
    async fn remove_queue<Q>(&self, queue_name: Q) -> Result<(), CacheError>
    where
        Q: AsRef<str> + Send + Sync;
}

#[async_trait]
impl<P: RedisPool> QueueOperations for CacheManager<P> {
    async fn push_to_queue<Q, V>(&self, queue_name: Q, items: &[V]) -> Result<(), CacheError>
    where
        Q: AsRef<str> + Send + Sync,
        V: Serialize + Send + Sync,
    {
        // RPUSH不接受零個值，空批次直接視為成功
        if items.is_empty() {
            return Ok(());
        }

        let key = queue_key(queue_name.as_ref());

        // 序列化全部元素後以單一命令推入
        let mut serialized = Vec::with_capacity(items.len());
        for item in items {
            let value = serde_json::to_string(item)
                .map_err(|e| CacheError::SerializationError(e.to_string()))?;
            serialized.push(value);
        }

        let mut conn = self.conn().await?;
        conn.rpush::<_, _, ()>(&key, serialized).await?;

        debug!("佇列推入 {}: {} 個元素", key, items.len());
        Ok(())
    }

    async fn pop_from_queue<Q>(
        &self,
        queue_name: Q,
        mode: PopMode,
    ) -> Result<Option<String>, CacheError>
    where
        Q: AsRef<str> + Send + Sync,
    {
        let key = queue_key(queue_name.as_ref());
        let mut conn = self.conn().await?;

        let value = match mode {
            // 讀取並移除頭部元素
            PopMode::Delete => conn.lpop::<_, Option<String>>(&key, None).await?,
            // 僅讀取頭部元素
            PopMode::Get => conn.lindex::<_, Option<String>>(&key, 0).await?,
        };

        debug!(
            "佇列讀取 {} ({:?}): {}",
            key,
            mode,
            if value.is_some() { "命中" } else { "佇列為空" }
        );

        Ok(value)
    }

    async fn pop_from_queue_typed<Q, V>(
        &self,
        queue_name: Q,
        mode: PopMode,
    ) -> Result<Option<V>, CacheError>
    where
        Q: AsRef<str> + Send + Sync,
        V: DeserializeOwned + Send + Sync,
    {
        match self.pop_from_queue(queue_name.as_ref(), mode).await? {
            Some(value) => match serde_json::from_str(&value) {
                Ok(deserialized) => Ok(Some(deserialized)),
                Err(e) => {
                    warn!(
                        "佇列元素反序列化失敗 [{}]: {}",
                        queue_name.as_ref(),
                        e
                    );
                    Err(CacheError::DeserializationError(e.to_string()))
                }
            },
            None => Ok(None),
        }
    }

    async fn queue_exists<Q>(&self, queue_name: Q) -> Result<bool, CacheError>
    where
        Q: AsRef<str> + Send + Sync,
    {
        self.exists(queue_key(queue_name.as_ref())).await
    }

    async fn remove_queue<Q>(&self, queue_name: Q) -> Result<(), CacheError>
    where
        Q: AsRef<str> + Send + Sync,
    {
        self.delete(queue_key(queue_name.as_ref())).await
    }
}
