//! Persistence for the delivery-range indexes.
//!
//! Everything goes through the narrow [`KvStore`] contract: string get/set
//! with expiry plus an optional geospatial set. [`RedisStore`] is the
//! production backend; [`MemoryStore`] keeps the same semantics in-process.

pub mod error;
pub mod geo;
pub mod keys;
pub mod kv;
pub mod memory;
pub mod redis_store;
pub mod shards;

use std::sync::Arc;

use drange_core::{AppConfig, StoreBackend};

pub use error::StoreError;
pub use geo::{format_member, parse_member, GeoIndexStore};
pub use keys::IndexName;
pub use kv::{GeoPoint, KvStore};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use shards::{chunk_plan, ShardStore};

/// Opens the backend selected by `config.store_backend`.
///
/// # Errors
///
/// Returns [`StoreError::Redis`] if the Redis URL is invalid or the initial
/// connection cannot be established.
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn KvStore>, StoreError> {
    match config.store_backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(&config.redis_url).await?;
            tracing::info!("connected to redis store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; indexes are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
