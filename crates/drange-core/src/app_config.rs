use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which key-value backend the indexes are persisted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    /// Process-local store. Snapshots vanish on restart.
    Memory,
}

/// How the spatial stage is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStrategy {
    /// Latitude/longitude indexes are chunked into plain keys and searched in-process.
    Sharded,
    /// Coordinates live in a store-side geospatial set; the store answers the radius search.
    NativeGeo,
}

impl std::fmt::Display for IndexStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexStrategy::Sharded => write!(f, "sharded"),
            IndexStrategy::NativeGeo => write!(f, "native-geo"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_feed_url: String,
    pub store_backend: StoreBackend,
    pub redis_url: String,
    pub index_strategy: IndexStrategy,
    pub shard_chunk_size: usize,
    pub index_ttl_secs: u64,
    pub max_search_radius_km: f64,
    pub catalog_utc_offset_minutes: i32,
    pub feed_request_timeout_secs: u64,
    pub feed_user_agent: String,
    pub feed_max_retries: u32,
    pub feed_retry_backoff_base_ms: u64,
    pub refresh_cron: Option<String>,
    pub api_keys: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_feed_url", &self.catalog_feed_url)
            .field("store_backend", &self.store_backend)
            .field("redis_url", &"[redacted]")
            .field("index_strategy", &self.index_strategy)
            .field("shard_chunk_size", &self.shard_chunk_size)
            .field("index_ttl_secs", &self.index_ttl_secs)
            .field("max_search_radius_km", &self.max_search_radius_km)
            .field(
                "catalog_utc_offset_minutes",
                &self.catalog_utc_offset_minutes,
            )
            .field(
                "feed_request_timeout_secs",
                &self.feed_request_timeout_secs,
            )
            .field("feed_user_agent", &self.feed_user_agent)
            .field("feed_max_retries", &self.feed_max_retries)
            .field(
                "feed_retry_backoff_base_ms",
                &self.feed_retry_backoff_base_ms,
            )
            .field("refresh_cron", &self.refresh_cron)
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .finish()
    }
}
