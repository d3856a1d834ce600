use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// The store rejected a coordinate pair it cannot index.
    #[error("invalid longitude,latitude pair")]
    InvalidCoordinates,

    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("failed to serialize {context}: {source}")]
    Serialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("value stored at {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

impl StoreError {
    /// True for [`StoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
