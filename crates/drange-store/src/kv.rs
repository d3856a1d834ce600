//! The key-value contract every backend implements.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// One member of a geospatial set.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub member: String,
    pub lat: f64,
    pub long: f64,
}

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value, expiring
    /// after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;

    /// Returns the string stored under `key`.
    ///
    /// A missing or expired key is [`StoreError::NotFound`], never an empty
    /// string.
    async fn get(&self, key: &str) -> Result<String, StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Atomically moves `from` to `to`, replacing any value at `to`. The
    /// expiry of `from` moves with it.
    ///
    /// A missing `from` is [`StoreError::NotFound`].
    async fn rename(&self, from: &str, to: &str) -> Result<(), StoreError>;

    /// Sets the expiry of an existing key. A missing key is ignored.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Adds one member to the geospatial set at `key`.
    ///
    /// Returns [`StoreError::InvalidCoordinates`] for a pair the store cannot
    /// index.
    async fn geo_add(&self, key: &str, point: GeoPoint) -> Result<(), StoreError>;

    /// Adds many members. Backends that support batching override this.
    async fn geo_add_many(&self, key: &str, points: &[GeoPoint]) -> Result<(), StoreError> {
        for point in points {
            self.geo_add(key, point.clone()).await?;
        }
        Ok(())
    }

    /// Members of the geospatial set at `key` within `radius_km` of
    /// `(lat, long)`. A missing key yields an empty list.
    async fn geo_search(
        &self,
        key: &str,
        lat: f64,
        long: f64,
        radius_km: f64,
    ) -> Result<Vec<String>, StoreError>;

    /// Round-trip health check.
    async fn ping(&self) -> Result<(), StoreError>;
}
