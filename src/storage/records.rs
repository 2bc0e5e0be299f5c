//! Book metadata records and the JSON record set

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Metadata extracted from one detail page
///
/// Created once by the detail parser and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub image_url: Url,
    #[serde(rename = "genre")]
    pub genres: Vec<String>,
    pub comments: Vec<String>,
}

/// Append-only, ordered collection of the records of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<BookRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: BookRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[BookRecord] {
        &self.records
    }
}

/// Writes the record set as a UTF-8 JSON array, replacing any previous file
///
/// Non-ASCII characters are written as-is, not as `\u` escapes.
///
/// # Arguments
///
/// * `path` - Destination of the JSON document
/// * `records` - Records in the order they were collected
pub fn save_records(path: &Path, records: &[BookRecord]) -> crate::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Reads a record set written by [`save_records`]
pub fn load_records(path: &Path) -> crate::Result<Vec<BookRecord>> {
    let content = std::fs::read_to_string(path)?;
    let records = serde_json::from_str(&content)?;
    Ok(records)
}
