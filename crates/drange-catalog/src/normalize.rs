//! Catalog records to validated [`Restaurant`] values.

use std::collections::HashSet;

use chrono::{NaiveTime, Timelike};
use drange_core::Restaurant;

use crate::error::{CatalogError, RowError};

/// Expected header, in order.
pub const CATALOG_COLUMNS: [&str; 7] = [
    "id",
    "latitude",
    "longitude",
    "availability_radius",
    "open_hour",
    "close_hour",
    "rating",
];

/// Header plus at least one data row.
const MIN_RECORDS: usize = 2;

/// Output of [`normalize_records`].
#[derive(Debug, Clone, Default)]
pub struct NormalizedCatalog {
    /// Valid rows in feed order.
    pub restaurants: Vec<Restaurant>,
    /// Data rows rejected with a [`RowError`].
    pub rows_skipped: usize,
}

/// Validates the header and converts every data row into a [`Restaurant`].
///
/// Malformed rows are logged at `warn` and skipped; the run continues.
///
/// # Errors
///
/// - [`CatalogError::TooFewRows`] if fewer than two records are present.
/// - [`CatalogError::InvalidHeader`] if the first record is not exactly
///   [`CATALOG_COLUMNS`].
pub fn normalize_records(records: &[Vec<String>]) -> Result<NormalizedCatalog, CatalogError> {
    if records.len() < MIN_RECORDS {
        return Err(CatalogError::TooFewRows {
            found: records.len(),
        });
    }

    check_header(&records[0])?;

    let mut seen: HashSet<String> = HashSet::with_capacity(records.len() - 1);
    let mut catalog = NormalizedCatalog {
        restaurants: Vec::with_capacity(records.len() - 1),
        rows_skipped: 0,
    };

    for (index, record) in records.iter().enumerate().skip(1) {
        let parsed = parse_restaurant_row(record).and_then(|restaurant| {
            if seen.insert(restaurant.id.clone()) {
                Ok(restaurant)
            } else {
                Err(RowError::DuplicateId(restaurant.id))
            }
        });

        match parsed {
            Ok(restaurant) => catalog.restaurants.push(restaurant),
            Err(reason) => {
                tracing::warn!(row = index + 1, %reason, "skipping malformed catalog row");
                catalog.rows_skipped += 1;
            }
        }
    }

    if catalog.restaurants.is_empty() {
        tracing::warn!(
            rows_skipped = catalog.rows_skipped,
            "catalog contains no valid restaurants"
        );
    }

    Ok(catalog)
}

fn check_header(header: &[String]) -> Result<(), CatalogError> {
    let matches = header.len() == CATALOG_COLUMNS.len()
        && header
            .iter()
            .enumerate()
            .all(|(i, cell)| strip_bom(cell, i) == CATALOG_COLUMNS[i]);

    if matches {
        Ok(())
    } else {
        Err(CatalogError::InvalidHeader {
            found: header.join(","),
        })
    }
}

fn strip_bom(cell: &str, position: usize) -> &str {
    if position == 0 {
        cell.trim_start_matches('\u{feff}')
    } else {
        cell
    }
}

fn parse_restaurant_row(record: &[String]) -> Result<Restaurant, RowError> {
    if record.len() != CATALOG_COLUMNS.len() {
        return Err(RowError::ColumnCount {
            expected: CATALOG_COLUMNS.len(),
            found: record.len(),
        });
    }

    let id = record[0].trim();
    if id.is_empty() {
        return Err(RowError::EmptyId);
    }

    let lat = parse_number("latitude", &record[1])?;
    let long = parse_number("longitude", &record[2])?;
    let radius = parse_number("availability_radius", &record[3])?;
    let open = parse_time("open_hour", &record[4])?;
    let close = parse_time("close_hour", &record[5])?;
    let rating = parse_number("rating", &record[6])?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(RowError::OutOfRange {
            field: "latitude",
            value: lat,
        });
    }
    if !(-180.0..=180.0).contains(&long) {
        return Err(RowError::OutOfRange {
            field: "longitude",
            value: long,
        });
    }
    if radius < 0.0 {
        return Err(RowError::OutOfRange {
            field: "availability_radius",
            value: radius,
        });
    }

    Ok(Restaurant {
        id: id.to_owned(),
        lat,
        long,
        radius,
        open,
        close,
        rating,
    })
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, RowError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RowError::InvalidNumber {
            field,
            value: raw.to_owned(),
        })
}

fn parse_time(field: &'static str, raw: &str) -> Result<u16, RowError> {
    parse_clock_time(raw).ok_or_else(|| RowError::InvalidTime {
        field,
        value: raw.to_owned(),
    })
}

/// Converts a clock time to an `HHMM` integer.
///
/// Accepts `HH:MM:SS`, `HH:MM`, and a bare `HHMM` number. Seconds are
/// dropped. Returns `None` for anything outside `00:00`..=`23:59`.
#[must_use]
pub fn parse_clock_time(raw: &str) -> Option<u16> {
    let raw = raw.trim();

    if !raw.is_empty() && raw.len() <= 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let value: u16 = raw.parse().ok()?;
        let (hour, minute) = (value / 100, value % 100);
        return (hour < 24 && minute < 60).then_some(value);
    }

    let time = NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()?;

    // hour < 24 and minute < 60, so the result always fits.
    #[allow(clippy::cast_possible_truncation)]
    let hhmm = (time.hour() * 100 + time.minute()) as u16;
    Some(hhmm)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
