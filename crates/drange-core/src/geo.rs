//! Great-circle distance and search-window sizing.
//!
//! Distances use the haversine formula on a spherical Earth. Window sizing
//! uses the flat `km / 111` approximation, which is only meant to bound a
//! prefilter; the exact check is always [`haversine_km`].

/// Mean Earth radius.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres spanned by one degree of latitude (flat approximation).
pub const KM_PER_DEGREE: f64 = 111.0;

/// Great-circle distance in kilometres between two `(lat, long)` points in degrees.
#[must_use]
pub fn haversine_km(lat1: f64, long1: f64, lat2: f64, long2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_long = (long2 - long1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_long / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Converts a distance in kilometres to an angular delta in degrees.
#[must_use]
pub fn km_to_degrees(km: f64) -> f64 {
    km / KM_PER_DEGREE
}
