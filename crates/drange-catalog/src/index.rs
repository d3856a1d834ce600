//! Query-friendly indexes derived from a normalized catalog.

use drange_core::{
    sort_by_coordinate, CoordinateEntry, EligibilityMap, EligibilitySchedule, Restaurant,
};

/// The full index set persisted by one preprocessing run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogIndexes {
    /// Sorted ascending by latitude.
    pub latitude: Vec<CoordinateEntry>,
    /// Sorted ascending by longitude.
    pub longitude: Vec<CoordinateEntry>,
    pub eligibility: EligibilityMap,
}

/// Builds both axis indexes and the eligibility map. Pure; no I/O.
#[must_use]
pub fn build_indexes(restaurants: &[Restaurant]) -> CatalogIndexes {
    let eligibility = restaurants
        .iter()
        .map(|r| {
            (
                r.id.clone(),
                EligibilitySchedule {
                    open: r.open,
                    close: r.close,
                    radius: r.radius,
                },
            )
        })
        .collect();

    CatalogIndexes {
        latitude: axis_index(restaurants, |r| r.lat),
        longitude: axis_index(restaurants, |r| r.long),
        eligibility,
    }
}

fn axis_index(
    restaurants: &[Restaurant],
    select: impl Fn(&Restaurant) -> f64,
) -> Vec<CoordinateEntry> {
    let mut entries: Vec<CoordinateEntry> = restaurants
        .iter()
        .map(|r| CoordinateEntry {
            coordinate: select(r),
            id: r.id.clone(),
        })
        .collect();
    sort_by_coordinate(&mut entries);
    entries
}
