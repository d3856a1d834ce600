//! Native-geo layout: coordinates in one store-side geospatial set, the
//! eligibility map in one JSON blob.
//!
//! Each set member encodes the whole candidate as
//! `<id>-<lat>-<long>-<radius>` so a radius search needs no second lookup.
//!
//! A rebuild fills a staging set and renames it over the live one, so a
//! failed rebuild leaves the previous set in place and queries never see a
//! half-written set.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use drange_core::{Candidate, EligibilityMap, Restaurant};
use regex::Regex;

use crate::error::StoreError;
use crate::keys::{ELIGIBILITY_BLOB_KEY, GEO_DATA_KEY, GEO_STAGING_KEY};
use crate::kv::{GeoPoint, KvStore};
use crate::memory::{GEO_MAX_LAT, GEO_MAX_LONG};

/// The id is everything before the last three numeric fields, so ids may
/// themselves contain `-`. The id is matched lazily: in `a--1.0-...` the
/// second dash is read as a minus sign, not as part of the id.
static MEMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<id>.+?)-(?P<lat>-?\d+(?:\.\d+)?)-(?P<long>-?\d+(?:\.\d+)?)-(?P<radius>\d+(?:\.\d+)?)$",
    )
    .expect("valid regex")
});

/// Encodes a restaurant as a geo set member, six decimals per number.
#[must_use]
pub fn format_member(id: &str, lat: f64, long: f64, radius: f64) -> String {
    format!("{id}-{lat:.6}-{long:.6}-{radius:.6}")
}

/// Decodes a member written by [`format_member`].
#[must_use]
pub fn parse_member(member: &str) -> Option<Candidate> {
    let caps = MEMBER_RE.captures(member)?;
    Some(Candidate {
        id: caps["id"].to_owned(),
        lat: caps["lat"].parse().ok()?,
        long: caps["long"].parse().ok()?,
        radius: caps["radius"].parse().ok()?,
    })
}

/// Reads and writes the native-geo layout through a [`KvStore`].
#[derive(Clone)]
pub struct GeoIndexStore {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl GeoIndexStore {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Replaces the geo set with `restaurants`. Returns the number of
    /// members written.
    ///
    /// On error the previous set is untouched.
    ///
    /// Restaurants outside the geohash latitude range cannot be indexed and
    /// are left out with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any store call fails.
    pub async fn write_restaurants(&self, restaurants: &[Restaurant]) -> Result<usize, StoreError> {
        let (points, unindexable): (Vec<_>, Vec<_>) = restaurants
            .iter()
            .partition(|r| r.lat.abs() <= GEO_MAX_LAT && r.long.abs() <= GEO_MAX_LONG);

        for restaurant in &unindexable {
            tracing::warn!(
                id = %restaurant.id,
                lat = restaurant.lat,
                "restaurant outside geo-indexable range; left out of geo set"
            );
        }

        let points: Vec<GeoPoint> = points
            .into_iter()
            .map(|r| GeoPoint {
                member: format_member(&r.id, r.lat, r.long, r.radius),
                lat: r.lat,
                long: r.long,
            })
            .collect();

        // An empty set is no key at all, so there is nothing to rename.
        if points.is_empty() {
            self.store.delete(GEO_DATA_KEY).await?;
            return Ok(0);
        }

        self.store.delete(GEO_STAGING_KEY).await?;
        self.store.geo_add_many(GEO_STAGING_KEY, &points).await?;
        self.store.expire(GEO_STAGING_KEY, self.ttl).await?;
        self.store.rename(GEO_STAGING_KEY, GEO_DATA_KEY).await?;
        Ok(points.len())
    }

    /// Persists the eligibility map as one blob.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    pub async fn write_eligibility(&self, map: &EligibilityMap) -> Result<(), StoreError> {
        let json = serde_json::to_string(map).map_err(|source| StoreError::Serialize {
            context: "eligibility map",
            source,
        })?;
        self.store.set(ELIGIBILITY_BLOB_KEY, json, self.ttl).await
    }

    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the catalog was never built.
    /// - [`StoreError::Corrupt`] if the blob cannot be decoded.
    pub async fn read_eligibility(&self) -> Result<EligibilityMap, StoreError> {
        let raw = self.store.get(ELIGIBILITY_BLOB_KEY).await?;
        serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt {
            key: ELIGIBILITY_BLOB_KEY.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Restaurants within `radius_km` of the query point.
    ///
    /// A coordinate pair the store cannot index yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Corrupt`] if a member cannot be decoded.
    /// - Any other store failure.
    pub async fn search(
        &self,
        lat: f64,
        long: f64,
        radius_km: f64,
    ) -> Result<Vec<Candidate>, StoreError> {
        let members = match self
            .store
            .geo_search(GEO_DATA_KEY, lat, long, radius_km)
            .await
        {
            Ok(members) => members,
            Err(StoreError::InvalidCoordinates) => {
                tracing::debug!(lat, long, "query point outside geo-indexable range");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        members
            .iter()
            .map(|member| {
                parse_member(member).ok_or_else(|| StoreError::Corrupt {
                    key: GEO_DATA_KEY.to_owned(),
                    reason: format!("unparsable member \"{member}\""),
                })
            })
            .collect()
    }
}
