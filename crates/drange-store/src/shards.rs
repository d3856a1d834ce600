//! Chunked persistence for indexes larger than one stored value may be.
//!
//! Each index is written as a run of JSON chunks plus a manifest listing the
//! chunk keys in sorted order. Chunks go first and the manifest last, so a
//! reader that finds a manifest finds every chunk it names. There is no
//! multi-key atomicity: a write that fails partway can leave fresh chunks
//! next to an old manifest until the next successful run.
//!
//! Readers fetch all chunks concurrently and re-sort coordinate indexes
//! after concatenation, so results never depend on fetch order.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use drange_core::{sort_by_coordinate, CoordinateEntry, EligibilityMap, EligibilitySchedule};
use futures::future::try_join_all;

use crate::error::StoreError;
use crate::keys::{chunk_key, manifest_key, IndexName};
use crate::kv::KvStore;

/// Splits `len` entries into `(chunk number, range)` pairs of at most
/// `chunk_size` entries. A zero `chunk_size` is treated as one.
#[must_use]
pub fn chunk_plan(len: usize, chunk_size: usize) -> Vec<(usize, std::ops::Range<usize>)> {
    let chunk_size = chunk_size.max(1);
    (0..len)
        .step_by(chunk_size)
        .enumerate()
        .map(|(n, start)| (n, start..(start + chunk_size).min(len)))
        .collect()
}

/// Reads and writes sharded indexes through a [`KvStore`].
#[derive(Clone)]
pub struct ShardStore {
    store: Arc<dyn KvStore>,
    chunk_size: usize,
    ttl: Duration,
}

impl ShardStore {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, chunk_size: usize, ttl: Duration) -> Self {
        Self {
            store,
            chunk_size: chunk_size.max(1),
            ttl,
        }
    }

    /// Persists a sorted coordinate index. Returns the number of chunks
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or any store write fails.
    pub async fn write_coordinate_index(
        &self,
        index: IndexName,
        entries: &[CoordinateEntry],
    ) -> Result<usize, StoreError> {
        let payloads = chunk_plan(entries.len(), self.chunk_size)
            .into_iter()
            .map(|(_, range)| {
                serde_json::to_string(&entries[range]).map_err(|source| StoreError::Serialize {
                    context: "coordinate chunk",
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.write_chunks(index, payloads).await
    }

    /// Reassembles a coordinate index, sorted ascending by coordinate.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the manifest or a listed chunk is missing.
    /// - [`StoreError::Corrupt`] if a stored value cannot be decoded.
    pub async fn read_coordinate_index(
        &self,
        index: IndexName,
    ) -> Result<Vec<CoordinateEntry>, StoreError> {
        let chunks = self.read_chunks(index).await?;

        let mut entries = Vec::new();
        for (key, payload) in chunks {
            let mut chunk: Vec<CoordinateEntry> =
                serde_json::from_str(&payload).map_err(|err| StoreError::Corrupt {
                    key,
                    reason: err.to_string(),
                })?;
            entries.append(&mut chunk);
        }
        sort_by_coordinate(&mut entries);
        Ok(entries)
    }

    /// Persists the eligibility map, chunked in id order. Returns the number
    /// of chunks written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or any store write fails.
    pub async fn write_eligibility(&self, map: &EligibilityMap) -> Result<usize, StoreError> {
        let mut ordered: Vec<(&String, &EligibilitySchedule)> = map.iter().collect();
        ordered.sort_by(|a, b| a.0.cmp(b.0));

        let payloads = chunk_plan(ordered.len(), self.chunk_size)
            .into_iter()
            .map(|(_, range)| {
                let chunk: BTreeMap<&str, &EligibilitySchedule> = ordered[range]
                    .iter()
                    .map(|(id, schedule)| (id.as_str(), *schedule))
                    .collect();
                serde_json::to_string(&chunk).map_err(|source| StoreError::Serialize {
                    context: "eligibility chunk",
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.write_chunks(IndexName::Eligibility, payloads).await
    }

    /// Reassembles the eligibility map.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the manifest or a listed chunk is missing.
    /// - [`StoreError::Corrupt`] if a stored value cannot be decoded.
    pub async fn read_eligibility(&self) -> Result<EligibilityMap, StoreError> {
        let chunks = self.read_chunks(IndexName::Eligibility).await?;

        let mut map = EligibilityMap::new();
        for (key, payload) in chunks {
            let chunk: EligibilityMap =
                serde_json::from_str(&payload).map_err(|err| StoreError::Corrupt {
                    key,
                    reason: err.to_string(),
                })?;
            map.extend(chunk);
        }
        Ok(map)
    }

    async fn write_chunks(
        &self,
        index: IndexName,
        payloads: Vec<String>,
    ) -> Result<usize, StoreError> {
        let mut manifest: Vec<String> = (0..payloads.len()).map(|n| chunk_key(index, n)).collect();

        try_join_all(
            manifest
                .iter()
                .zip(payloads)
                .map(|(key, payload)| self.store.set(key, payload, self.ttl)),
        )
        .await?;

        manifest.sort();
        let manifest_json =
            serde_json::to_string(&manifest).map_err(|source| StoreError::Serialize {
                context: "shard manifest",
                source,
            })?;
        self.store
            .set(&manifest_key(index), manifest_json, self.ttl)
            .await?;

        tracing::debug!(%index, chunks = manifest.len(), "wrote sharded index");
        Ok(manifest.len())
    }

    /// Returns `(chunk key, payload)` pairs in manifest order.
    async fn read_chunks(&self, index: IndexName) -> Result<Vec<(String, String)>, StoreError> {
        let key = manifest_key(index);
        let raw = self.store.get(&key).await?;
        let manifest: Vec<String> =
            serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt {
                key,
                reason: err.to_string(),
            })?;

        let payloads = try_join_all(manifest.iter().map(|k| self.store.get(k))).await?;
        Ok(manifest.into_iter().zip(payloads).collect())
    }
}
