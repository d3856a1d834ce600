use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by catalog feed host (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("catalog feed not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog header does not match the expected columns; found [{found}]")]
    InvalidHeader { found: String },

    #[error("catalog has {found} rows; a header and at least one data row are required")]
    TooFewRows { found: usize },
}

/// Reason a single data row was rejected. Rows are skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("empty restaurant id")]
    EmptyId,

    #[error("duplicate restaurant id \"{0}\"")]
    DuplicateId(String),

    #[error("{field} is not a number: \"{value}\"")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} is not a clock time: \"{value}\"")]
    InvalidTime { field: &'static str, value: String },

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}
