use crate::domain::ports::Storage;
use crate::utils::error::{CrawlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes records as CSV with a header row taken from the field names.
pub fn to_csv_bytes<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| CrawlError::IoError(e.into_error()))
}

/// Parses a headed CSV table; columns not present in `T` are ignored.
pub fn from_csv_bytes<T: DeserializeOwned>(data: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_reader(data);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Writes `records` to `path`, replacing any previous file. Empty tables are
/// skipped and reported as `false`.
pub async fn write_table<S, T>(storage: &S, path: &str, records: &[T]) -> Result<bool>
where
    S: Storage,
    T: Serialize + Sync,
{
    if records.is_empty() {
        return Ok(false);
    }
    let data = to_csv_bytes(records)?;
    storage.write_file(path, &data).await?;
    Ok(true)
}

pub async fn read_table<S, T>(storage: &S, path: &str) -> Result<Vec<T>>
where
    S: Storage,
    T: DeserializeOwned,
{
    let data = storage.read_file(path).await?;
    from_csv_bytes(&data)
}
