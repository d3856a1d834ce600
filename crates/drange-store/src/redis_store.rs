//! Redis backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::error::StoreError;
use crate::kv::{GeoPoint, KvStore};

/// Substring of the server error returned for coordinates outside the
/// geohash range.
const INVALID_PAIR_ERROR: &str = "invalid longitude,latitude pair";

/// Substring of the server error `RENAME` returns for a missing source key.
const NO_SUCH_KEY_ERROR: &str = "no such key";

/// Members sent per `GEOADD` command.
const GEOADD_BATCH: usize = 5_000;

/// Redis-backed [`KvStore`].
///
/// Holds a [`ConnectionManager`], which reconnects transparently and is
/// cheap to clone per command.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Opens a managed connection to `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Redis`] if the URL is invalid or the server is
    /// unreachable.
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

fn map_geo_error(err: redis::RedisError) -> StoreError {
    if err.to_string().contains(INVALID_PAIR_ERROR) {
        StoreError::InvalidCoordinates
    } else {
        StoreError::Redis(err)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String, StoreError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        value.ok_or_else(|| StoreError::NotFound {
            key: key.to_owned(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async::<i64>(&mut conn)
            .await?;
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        redis::cmd("RENAME")
            .arg(from)
            .arg(to)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|err| {
                if err.to_string().contains(NO_SUCH_KEY_ERROR) {
                    StoreError::NotFound {
                        key: from.to_owned(),
                    }
                } else {
                    StoreError::Redis(err)
                }
            })
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        redis::cmd("PEXPIRE")
            .arg(key)
            .arg(ttl_millis(ttl))
            .query_async::<i64>(&mut conn)
            .await?;
        Ok(())
    }

    async fn geo_add(&self, key: &str, point: GeoPoint) -> Result<(), StoreError> {
        self.geo_add_many(key, std::slice::from_ref(&point)).await
    }

    async fn geo_add_many(&self, key: &str, points: &[GeoPoint]) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        for batch in points.chunks(GEOADD_BATCH) {
            let mut cmd = redis::cmd("GEOADD");
            cmd.arg(key);
            for point in batch {
                cmd.arg(point.long).arg(point.lat).arg(&point.member);
            }
            cmd.query_async::<i64>(&mut conn)
                .await
                .map_err(map_geo_error)?;
        }
        Ok(())
    }

    async fn geo_search(
        &self,
        key: &str,
        lat: f64,
        long: f64,
        radius_km: f64,
    ) -> Result<Vec<String>, StoreError> {
        let mut conn = self.manager.clone();
        redis::cmd("GEOSEARCH")
            .arg(key)
            .arg("FROMLONLAT")
            .arg(long)
            .arg(lat)
            .arg("BYRADIUS")
            .arg(radius_km)
            .arg("km")
            .query_async::<Vec<String>>(&mut conn)
            .await
            .map_err(map_geo_error)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
