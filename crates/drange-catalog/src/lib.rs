pub mod error;
pub mod feed;
pub mod index;
pub mod normalize;
pub mod records;
mod retry;

pub use error::{CatalogError, RowError};
pub use feed::{CatalogSource, FeedClient, StaticCatalog};
pub use index::{build_indexes, CatalogIndexes};
pub use normalize::{normalize_records, parse_clock_time, NormalizedCatalog, CATALOG_COLUMNS};
pub use records::csv_records;
