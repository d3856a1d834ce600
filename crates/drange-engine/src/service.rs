//! The two operations the rest of the system calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use drange_catalog::{build_indexes, csv_records, normalize_records, CatalogSource};
use drange_core::{clock_hhmm, AppConfig, IndexStrategy, Restaurant};
use drange_store::{GeoIndexStore, IndexName, KvStore, ShardStore};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::distance::within_delivery_radius;
use crate::error::EngineError;
use crate::retrieval::{fetch_native_geo, fetch_sharded};
use crate::spatial::find_candidates;
use crate::temporal::filter_open;

/// Tunables for [`DeliveryRangeService`].
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub strategy: IndexStrategy,
    pub shard_chunk_size: usize,
    pub index_ttl: Duration,
    /// Upper bound on any restaurant's delivery radius; sizes the spatial window.
    pub max_search_radius_km: f64,
    /// Offset of the catalog's opening-hours clock from UTC.
    pub utc_offset: FixedOffset,
}

impl EngineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let utc_offset = FixedOffset::east_opt(config.catalog_utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix());
        Self {
            strategy: config.index_strategy,
            shard_chunk_size: config.shard_chunk_size,
            index_ttl: Duration::from_secs(config.index_ttl_secs),
            max_search_radius_km: config.max_search_radius_km,
            utc_offset,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            strategy: IndexStrategy::Sharded,
            shard_chunk_size: 100_000,
            index_ttl: Duration::from_secs(45_000),
            max_search_radius_km: 8.0,
            utc_offset: Utc.fix(),
        }
    }
}

/// Outcome of one preprocessing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreprocessReport {
    pub restaurants_indexed: usize,
    pub rows_skipped: usize,
    /// Chunks across all sharded indexes; zero for the native-geo layout.
    pub chunks_written: usize,
    /// Indexed restaurants whose radius is wider than the search window.
    /// Customers farther away than the window never see them.
    pub radius_exceeds_window: usize,
}

/// Builds the catalog indexes and answers delivery-range queries.
///
/// Holds no per-query state; every query reads the snapshot currently in
/// the store. Clones share one rebuild lock, so rebuilds started through any
/// clone run one at a time.
#[derive(Clone)]
pub struct DeliveryRangeService {
    source: Arc<dyn CatalogSource>,
    store: Arc<dyn KvStore>,
    shards: ShardStore,
    geo: GeoIndexStore,
    settings: EngineSettings,
    rebuild_lock: Arc<Mutex<()>>,
}

impl DeliveryRangeService {
    #[must_use]
    pub fn new(
        source: Arc<dyn CatalogSource>,
        store: Arc<dyn KvStore>,
        settings: EngineSettings,
    ) -> Self {
        let shards = ShardStore::new(
            Arc::clone(&store),
            settings.shard_chunk_size,
            settings.index_ttl,
        );
        let geo = GeoIndexStore::new(Arc::clone(&store), settings.index_ttl);
        Self {
            source,
            store,
            shards,
            geo,
            settings,
            rebuild_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Fetches the feed, rebuilds every index and replaces the stored
    /// snapshot.
    ///
    /// Nothing is written unless the feed parses and its header matches.
    /// A call made while another rebuild is running waits for it to finish,
    /// then fetches the feed afresh.
    ///
    /// # Errors
    ///
    /// - `Feed` if the feed cannot be fetched.
    /// - `Format` / `Data` if the feed does not form a catalog.
    /// - `Store` if a write fails; earlier writes of the same run are kept.
    pub async fn preprocess_restaurants(&self) -> Result<PreprocessReport, EngineError> {
        let _rebuild = self.rebuild_lock.lock().await;

        let bytes = self.source.fetch_catalog_csv().await?;
        let records = csv_records(&bytes)?;
        let catalog = normalize_records(&records)?;
        let indexes = build_indexes(&catalog.restaurants);
        let radius_exceeds_window = self.count_radius_beyond_window(&catalog.restaurants);

        let chunks_written = match self.settings.strategy {
            IndexStrategy::Sharded => {
                let (lat_chunks, long_chunks, eligibility_chunks) = tokio::try_join!(
                    self.shards
                        .write_coordinate_index(IndexName::Latitude, &indexes.latitude),
                    self.shards
                        .write_coordinate_index(IndexName::Longitude, &indexes.longitude),
                    self.shards.write_eligibility(&indexes.eligibility),
                )?;
                lat_chunks + long_chunks + eligibility_chunks
            }
            IndexStrategy::NativeGeo => {
                tokio::try_join!(
                    self.geo.write_restaurants(&catalog.restaurants),
                    self.geo.write_eligibility(&indexes.eligibility),
                )?;
                0
            }
        };

        let report = PreprocessReport {
            restaurants_indexed: catalog.restaurants.len(),
            rows_skipped: catalog.rows_skipped,
            chunks_written,
            radius_exceeds_window,
        };
        tracing::info!(
            strategy = %self.settings.strategy,
            restaurants_indexed = report.restaurants_indexed,
            rows_skipped = report.rows_skipped,
            chunks_written = report.chunks_written,
            radius_exceeds_window = report.radius_exceeds_window,
            "catalog preprocessing complete"
        );
        Ok(report)
    }

    fn count_radius_beyond_window(&self, restaurants: &[Restaurant]) -> usize {
        let window = self.settings.max_search_radius_km;
        restaurants
            .iter()
            .filter(|r| r.radius > window)
            .inspect(|r| {
                tracing::warn!(
                    id = %r.id,
                    radius_km = r.radius,
                    max_search_radius_km = window,
                    "delivery radius wider than search window; outer area unreachable"
                );
            })
            .count()
    }

    /// Ids of the restaurants that deliver to `(lat, long)` at `now`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the catalog was never built or has expired.
    /// - `Store` if a fetch fails or a stored value is corrupt.
    pub async fn calculate_delivery_range(
        &self,
        lat: f64,
        long: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, EngineError> {
        let now_hhmm = clock_hhmm(now, self.settings.utc_offset);
        let max_radius = self.settings.max_search_radius_km;

        let (candidates, eligibility) = match self.settings.strategy {
            IndexStrategy::Sharded => {
                let snapshot = fetch_sharded(&self.shards).await?;
                let candidates =
                    find_candidates(&snapshot.latitude, &snapshot.longitude, lat, long, max_radius);
                (candidates, snapshot.eligibility)
            }
            IndexStrategy::NativeGeo => fetch_native_geo(&self.geo, lat, long, max_radius).await?,
        };

        let spatial = candidates.len();
        let open = filter_open(candidates, &eligibility, now_hhmm);
        let temporal = open.len();
        let ids = within_delivery_radius(open, lat, long);

        tracing::debug!(
            lat,
            long,
            now = now_hhmm,
            spatial,
            temporal,
            matched = ids.len(),
            "delivery range calculated"
        );
        Ok(ids)
    }

    /// Checks that the store answers.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the ping fails.
    pub async fn ping(&self) -> Result<(), EngineError> {
        self.store.ping().await.map_err(EngineError::from)
    }
}
