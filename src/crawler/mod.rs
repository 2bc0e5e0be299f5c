//! Crawler module for catalog walking and book downloading
//!
//! This module contains the core pipeline, including:
//! - HTTP fetching with redirect-as-missing classification and backoff
//! - Catalog page link extraction
//! - Detail page parsing
//! - Text and cover image downloads
//! - Overall run coordination

mod catalog;
mod coordinator;
mod downloader;
mod fetcher;
mod parser;

pub use catalog::{extract_catalog_entries, CatalogCrawl, CatalogCrawler};
pub use coordinator::{Coordinator, RunSummary};
pub use downloader::AssetDownloader;
pub use fetcher::{
    build_http_client, fetch_with_policy, FetchedPage, Fetcher, HttpFetcher, RetryPolicy,
};
pub use parser::{parse_book_page, TITLE_DELIMITER};

use crate::config::Config;
use crate::ScraperError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Walk the configured catalog page range
/// 3. Fetch and parse each detail page
/// 4. Download cover images and text editions unless disabled
/// 5. Write the JSON record set
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed
/// * `Err(ScraperError)` - Crawl aborted
pub async fn crawl(config: Config) -> Result<RunSummary, ScraperError> {
    Coordinator::new(config)?.run().await
}
