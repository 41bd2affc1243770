use cacheq::config::RedisConfig;
use cacheq::redis::{CacheManager, ConnectionPool, RedisPool};
use std::sync::{Arc, Once};

static TRACING_INIT: Once = Once::new();

/// Initialize test logging once, honoring RUST_LOG.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Build the test Redis config, honoring the REDIS_TEST_URL override.
pub fn test_config() -> RedisConfig {
    let url = std::env::var("REDIS_TEST_URL")
        .unwrap_or_else(|_| "redis://localhost:6379".to_string());

    RedisConfig {
        url,
        pool_size: 3,
        connection_timeout_secs: 5,
    }
}

/// Set up a cache manager against the test Redis server.
///
/// Returns None (and the test should skip) when no Redis server is reachable.
pub async fn setup_cache(test_name: &str) -> Option<CacheManager<Arc<ConnectionPool>>> {
    init_tracing();

    match ConnectionPool::new(test_config()).await {
        Ok(pool) => {
            let pool = Arc::new(pool);
            if pool.check_health().await {
                Some(CacheManager::new(pool))
            } else {
                eprintln!("Skipping '{}' - Redis server not healthy", test_name);
                None
            }
        }
        Err(e) => {
            eprintln!("Skipping '{}' - cannot reach Redis: {}", test_name, e);
            None
        }
    }
}
