//! Logical key layout.

/// Geospatial set holding every restaurant in the native-geo layout.
pub const GEO_DATA_KEY: &str = "restaurants:geodata";

/// Build target for a native-geo rebuild; renamed over [`GEO_DATA_KEY`] once
/// complete.
pub const GEO_STAGING_KEY: &str = "restaurants:geodata:staging";

/// Single JSON blob holding the eligibility map in the native-geo layout.
pub const ELIGIBILITY_BLOB_KEY: &str = "restaurants:eligibility";

/// The three sharded indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexName {
    Latitude,
    Longitude,
    Eligibility,
}

impl IndexName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IndexName::Latitude => "latitude",
            IndexName::Longitude => "longitude",
            IndexName::Eligibility => "eligibility",
        }
    }
}

impl std::fmt::Display for IndexName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[must_use]
pub fn manifest_key(index: IndexName) -> String {
    format!("restaurants:{index}:manifest")
}

/// Chunk numbers are zero-padded so lexicographic order equals creation order.
#[must_use]
pub fn chunk_key(index: IndexName, n: usize) -> String {
    format!("restaurants:{index}:chunk:{n:06}")
}
