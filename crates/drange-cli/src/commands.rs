//! Command handlers for the CLI.
//!
//! Called from `main` once config, store and service are set up.

use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use drange_engine::DeliveryRangeService;

/// Parses an `--at` value. Accepts `HH:MM` and `HH:MM:SS`.
pub(crate) fn parse_clock_arg(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("expected HH:MM, got \"{raw}\""))
}

/// The instant at which the catalog clock (`offset` from UTC) shows `at` on
/// the same local day as `now`.
pub(crate) fn resolve_query_time(
    now: DateTime<Utc>,
    at: NaiveTime,
    offset: FixedOffset,
) -> anyhow::Result<DateTime<Utc>> {
    let local_date = now.with_timezone(&offset).date_naive();
    let local = local_date
        .and_time(at)
        .and_local_timezone(offset)
        .single()
        .with_context(|| format!("{at} is not a valid time at offset {offset}"))?;
    Ok(local.with_timezone(&Utc))
}

/// Run one preprocessing pass and print the counts.
///
/// # Errors
///
/// Returns an error if the feed cannot be fetched or parsed, or a store
/// write fails.
pub(crate) async fn run_preprocess(service: &DeliveryRangeService) -> anyhow::Result<()> {
    let report = service
        .preprocess_restaurants()
        .await
        .context("catalog preprocessing failed")?;

    println!("restaurants indexed: {}", report.restaurants_indexed);
    println!("rows skipped:        {}", report.rows_skipped);
    println!("chunks written:      {}", report.chunks_written);
    println!("radius over window:  {}", report.radius_exceeds_window);
    Ok(())
}

/// Run one delivery-range query and print the matching ids, one per line.
///
/// # Errors
///
/// Returns an error if the catalog was never built or the store fails.
pub(crate) async fn run_query(
    service: &DeliveryRangeService,
    lat: f64,
    long: f64,
    at: Option<NaiveTime>,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let when = match at {
        Some(at) => resolve_query_time(now, at, service.settings().utc_offset)?,
        None => now,
    };

    let ids = service
        .calculate_delivery_range(lat, long, when)
        .await
        .context("delivery range query failed")?;

    if ids.is_empty() {
        println!("no restaurants deliver to ({lat}, {long}) at {when}");
        return Ok(());
    }

    for id in &ids {
        println!("{id}");
    }
    tracing::info!(count = ids.len(), "query complete");
    Ok(())
}
