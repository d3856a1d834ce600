//! Concurrent fetch of everything a query needs.
//!
//! The fetches run together and are joined with `tokio::try_join!`: the
//! first error is returned and the remaining fetches are dropped, so no
//! partial snapshot ever reaches the filters.

use drange_core::{Candidate, CoordinateEntry, EligibilityMap};
use drange_store::{GeoIndexStore, IndexName, ShardStore, StoreError};

/// Indexes read from the sharded layout.
#[derive(Debug, Clone, Default)]
pub struct ShardedSnapshot {
    pub latitude: Vec<CoordinateEntry>,
    pub longitude: Vec<CoordinateEntry>,
    pub eligibility: EligibilityMap,
}

/// Fetches both axis indexes and the eligibility map.
///
/// # Errors
///
/// Returns the first [`StoreError`] observed among the three fetches.
pub async fn fetch_sharded(shards: &ShardStore) -> Result<ShardedSnapshot, StoreError> {
    let (latitude, longitude, eligibility) = tokio::try_join!(
        shards.read_coordinate_index(IndexName::Latitude),
        shards.read_coordinate_index(IndexName::Longitude),
        shards.read_eligibility(),
    )?;

    Ok(ShardedSnapshot {
        latitude,
        longitude,
        eligibility,
    })
}

/// Runs the store-side radius search alongside the eligibility fetch.
///
/// # Errors
///
/// Returns the first [`StoreError`] observed among the two calls.
pub async fn fetch_native_geo(
    geo: &GeoIndexStore,
    lat: f64,
    long: f64,
    radius_km: f64,
) -> Result<(Vec<Candidate>, EligibilityMap), StoreError> {
    tokio::try_join!(geo.search(lat, long, radius_km), geo.read_eligibility())
}
