// 模組定義
pub mod config;
pub mod redis;

// 重新導出常用組件
pub use config::RedisConfig;
pub use redis::{
    CacheError, CacheManager, CacheOperations, ConnectionPool, PopMode, QueueOperations,
    RedisPool, RedisPoolError,
};
