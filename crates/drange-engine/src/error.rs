use drange_catalog::CatalogError;
use drange_store::StoreError;
use thiserror::Error;

/// Coarse failure class, mapped to a transport status at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Header or CSV structure does not match the catalog schema.
    Format,
    /// The feed parsed but holds too little data to build a catalog.
    Data,
    /// The backing store failed or returned an undecodable value.
    Store,
    /// An index was never built or has expired.
    NotFound,
    /// The catalog feed could not be fetched.
    Feed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Format => "format",
            ErrorKind::Data => "data",
            ErrorKind::Store => "store",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Feed => "feed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Catalog(err) => match err {
                CatalogError::InvalidHeader { .. } | CatalogError::Csv(_) => ErrorKind::Format,
                CatalogError::TooFewRows { .. } => ErrorKind::Data,
                CatalogError::Http(_)
                | CatalogError::RateLimited { .. }
                | CatalogError::NotFound { .. }
                | CatalogError::UnexpectedStatus { .. } => ErrorKind::Feed,
            },
            EngineError::Store(err) => match err {
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::InvalidCoordinates
                | StoreError::Redis(_)
                | StoreError::Backend(_)
                | StoreError::Serialize { .. }
                | StoreError::Corrupt { .. } => ErrorKind::Store,
            },
        }
    }
}
