use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// One validated row of the catalog feed.
///
/// `open` and `close` are clock times encoded as `HHMM` integers
/// (`2130` is 21:30).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub lat: f64,
    pub long: f64,
    pub radius: f64,
    pub open: u16,
    pub close: u16,
    pub rating: f64,
}

/// A `(coordinate, id)` pair on one axis. Stored indexes keep these sorted
/// ascending by `coordinate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateEntry {
    pub coordinate: f64,
    pub id: String,
}

/// Opening window and delivery radius for one restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibilitySchedule {
    pub open: u16,
    pub close: u16,
    pub radius: f64,
}

pub type EligibilityMap = HashMap<String, EligibilitySchedule>;

/// Sorts an axis index ascending by coordinate. The sort is stable; equal
/// coordinates keep their relative order.
pub fn sort_by_coordinate(entries: &mut [CoordinateEntry]) {
    entries.sort_by(|a, b| a.coordinate.total_cmp(&b.coordinate));
}

/// A restaurant that survived the spatial stage of a query.
///
/// `radius` is the working delivery radius; the temporal stage replaces it
/// with the radius of the matching schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub lat: f64,
    pub long: f64,
    pub radius: f64,
}

/// Reduces a timestamp to an `HHMM` integer on a clock `offset` away from UTC.
#[must_use]
pub fn clock_hhmm(now: DateTime<Utc>, offset: FixedOffset) -> u16 {
    let local = now.with_timezone(&offset);
    // hour < 24 and minute < 60, so the result always fits.
    #[allow(clippy::cast_possible_truncation)]
    let hhmm = (local.hour() * 100 + local.minute()) as u16;
    hhmm
}
