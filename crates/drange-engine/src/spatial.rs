//! Bounding-box prefilter over the two sorted axis indexes.

use std::collections::HashMap;
use std::ops::Range;

use drange_core::geo::km_to_degrees;
use drange_core::{Candidate, CoordinateEntry};

/// Index range of `entries` whose coordinate lies in
/// `[target - delta, target + delta]`.
///
/// `entries` must be sorted ascending by coordinate. The lower bound is the
/// first index with `coordinate >= target - delta`; the upper bound is the
/// first index with `coordinate > target + delta`. A non-finite or negative
/// window yields an empty range.
#[must_use]
pub fn bound_range(entries: &[CoordinateEntry], target: f64, delta: f64) -> Range<usize> {
    let low = target - delta;
    let high = target + delta;
    if !(low.is_finite() && high.is_finite()) || low > high {
        return 0..0;
    }

    let lower = entries.partition_point(|e| e.coordinate < low);
    let upper = entries.partition_point(|e| e.coordinate <= high);
    lower..upper.max(lower)
}

/// Candidates inside the `max_radius_km` box around `(lat, long)`.
///
/// The latitude sub-range is frozen into an id -> latitude map, then the
/// longitude sub-range is scanned against it. Output follows longitude
/// order. Each candidate starts with `max_radius_km` as its working radius.
#[must_use]
pub fn find_candidates(
    latitude: &[CoordinateEntry],
    longitude: &[CoordinateEntry],
    lat: f64,
    long: f64,
    max_radius_km: f64,
) -> Vec<Candidate> {
    let delta = km_to_degrees(max_radius_km);

    let lat_range = bound_range(latitude, lat, delta);
    if lat_range.is_empty() {
        return Vec::new();
    }
    let long_range = bound_range(longitude, long, delta);
    if long_range.is_empty() {
        return Vec::new();
    }

    let by_id: HashMap<&str, f64> = latitude[lat_range]
        .iter()
        .map(|e| (e.id.as_str(), e.coordinate))
        .collect();

    longitude[long_range]
        .iter()
        .filter_map(|e| {
            by_id.get(e.id.as_str()).map(|&candidate_lat| Candidate {
                id: e.id.clone(),
                lat: candidate_lat,
                long: e.coordinate,
                radius: max_radius_km,
            })
        })
        .collect()
}
