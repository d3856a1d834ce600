//! Raw CSV bytes to string records.

use crate::error::CatalogError;

/// Splits a CSV body into records, header included.
///
/// The reader is flexible: rows of a different width than the header are
/// returned as-is so the normalizer can reject them one by one. Cells are
/// trimmed and blank lines are dropped. A row that is not valid UTF-8 is
/// skipped with a warning; any other read error is fatal.
///
/// # Errors
///
/// Returns [`CatalogError::Csv`] on an unrecoverable read error.
pub fn csv_records(bytes: &[u8]) -> Result<Vec<Vec<String>>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => records.push(record.iter().map(str::to_owned).collect()),
            Err(err) if matches!(err.kind(), csv::ErrorKind::Utf8 { .. }) => {
                tracing::warn!(row = index + 1, error = %err, "skipping row that is not valid UTF-8");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(records)
}
