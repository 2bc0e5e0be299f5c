//! Storage module for persisting crawl results
//!
//! This module handles everything the pipeline writes to disk:
//! - The JSON record set of parsed book metadata
//! - Downloaded text editions and cover images

mod files;
mod records;

pub use files::write_asset;
pub use records::{load_records, save_records, BookRecord, RecordSet};
