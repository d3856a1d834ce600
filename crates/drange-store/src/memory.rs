//! Process-local backend with the same observable semantics as Redis.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use drange_core::geo::haversine_km;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::kv::{GeoPoint, KvStore};

/// Latitude limit of the Web Mercator geohash space Redis indexes.
pub const GEO_MAX_LAT: f64 = 85.051_128_78;
pub const GEO_MAX_LONG: f64 = 180.0;

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    /// member -> (lat, long)
    Geo(HashMap<String, (f64, f64)>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// In-memory [`KvStore`] for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Live keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|(_, e)| e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::Backend(format!(
        "WRONGTYPE operation against key {key} holding the wrong kind of value"
    ))
}

/// Drops expired entries. Runs on every write, so the map never holds more
/// than the live keys plus those expired since the last write.
fn purge_expired(entries: &mut HashMap<String, Entry>, now: Instant) {
    entries.retain(|_, entry| entry.is_live(now));
}

fn check_geo_pair(lat: f64, long: f64) -> Result<(), StoreError> {
    if lat.abs() <= GEO_MAX_LAT && long.abs() <= GEO_MAX_LONG {
        Ok(())
    } else {
        Err(StoreError::InvalidCoordinates)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let entry = Entry {
            value: Value::Text(value),
            expires_at: now.checked_add(ttl),
        };
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, now);
        entries.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String, StoreError> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => match &entry.value {
                Value::Text(text) => Ok(text.clone()),
                Value::Geo(_) => Err(wrong_type(key)),
            },
            _ => Err(StoreError::NotFound {
                key: key.to_owned(),
            }),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, Instant::now());
        let entry = entries.remove(from).ok_or_else(|| StoreError::NotFound {
            key: from.to_owned(),
        })?;
        entries.insert(to.to_owned(), entry);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.write().await.get_mut(key) {
            if entry.is_live(now) {
                entry.expires_at = now.checked_add(ttl);
            }
        }
        Ok(())
    }

    async fn geo_add(&self, key: &str, point: GeoPoint) -> Result<(), StoreError> {
        self.geo_add_many(key, std::slice::from_ref(&point)).await
    }

    async fn geo_add_many(&self, key: &str, points: &[GeoPoint]) -> Result<(), StoreError> {
        for point in points {
            check_geo_pair(point.lat, point.long)?;
        }

        let now = Instant::now();
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, now);
        let entry = entries.entry(key.to_owned()).or_insert_with(|| Entry {
            value: Value::Geo(HashMap::new()),
            expires_at: None,
        });

        let Value::Geo(members) = &mut entry.value else {
            return Err(wrong_type(key));
        };
        for point in points {
            members.insert(point.member.clone(), (point.lat, point.long));
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
        check_geo_pair(lat, long)?;

        let entries = self.entries.read().await;
        let Some(entry) = entries.get(key).filter(|e| e.is_live(Instant::now())) else {
            return Ok(Vec::new());
        };
        let Value::Geo(members) = &entry.value else {
            return Err(wrong_type(key));
        };

        let mut hits: Vec<(f64, &String)> = members
            .iter()
            .filter_map(|(member, &(m_lat, m_long))| {
                let distance = haversine_km(lat, long, m_lat, m_long);
                (distance <= radius_km).then_some((distance, member))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        Ok(hits.into_iter().map(|(_, member)| member.clone()).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
