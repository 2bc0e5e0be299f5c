//! Crawler coordinator - main pipeline orchestration logic
//!
//! This module sequences the whole run:
//! - Walking the catalog for detail page links
//! - Fetching and parsing each detail page
//! - Downloading cover images and text editions
//! - Writing the final JSON record set
//!
//! Books are processed one at a time in catalog order.

use crate::config::Config;
use crate::crawler::catalog::CatalogCrawler;
use crate::crawler::downloader::AssetDownloader;
use crate::crawler::fetcher::{fetch_with_policy, Fetcher, HttpFetcher, RetryPolicy};
use crate::crawler::parser::parse_book_page;
use crate::state::BookState;
use crate::storage::{save_records, RecordSet};
use crate::url::{text_endpoint_url, CatalogEntry};
use crate::{FetchError, ScraperError};
use url::Url;

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub catalog_pages_fetched: u32,
    pub catalog_pages_skipped: u32,
    pub books_discovered: usize,
    pub books_recorded: usize,
    pub books_skipped: usize,
    pub texts_written: usize,
    pub images_written: usize,
}

/// Main pipeline coordinator structure
pub struct Coordinator<F> {
    config: Config,
    fetcher: F,
    policy: RetryPolicy,
    text_endpoint: Url,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator backed by a reqwest client
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScraperError)` - The HTTP client or the site URLs could not be built
    pub fn new(config: Config) -> Result<Self, ScraperError> {
        let fetcher = HttpFetcher::from_config(&config.crawler, &config.user_agent)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a coordinator that performs all requests through `fetcher`
    pub fn with_fetcher(config: Config, fetcher: F) -> Result<Self, ScraperError> {
        let text_endpoint = text_endpoint_url(&config.crawler.site_url)?;
        let policy = RetryPolicy::from_config(&config.crawler);

        Ok(Self {
            config,
            fetcher,
            policy,
            text_endpoint,
        })
    }

    /// Runs the whole pipeline and writes the record set
    ///
    /// Missing and unreachable pages or books are logged and skipped. A
    /// malformed detail page or a local IO failure ends the run with an error,
    /// in which case no record set is written.
    pub async fn run(&self) -> Result<RunSummary, ScraperError> {
        let crawler_config = &self.config.crawler;
        tracing::info!(
            "Crawling catalog pages {}..{} of {}",
            crawler_config.start_page,
            crawler_config.end_page,
            crawler_config.site_url
        );

        let start_time = std::time::Instant::now();
        let catalog = CatalogCrawler::from_config(crawler_config)
            .crawl(
                &self.fetcher,
                &self.policy,
                crawler_config.start_page,
                crawler_config.end_page,
            )
            .await?;

        let mut summary = RunSummary {
            catalog_pages_fetched: catalog.pages_fetched,
            catalog_pages_skipped: catalog.pages_skipped,
            books_discovered: catalog.entries.len(),
            ..RunSummary::default()
        };
        tracing::info!(
            "Found {} books on {} catalog pages",
            summary.books_discovered,
            summary.catalog_pages_fetched
        );

        let mut records = RecordSet::new();
        for (index, entry) in catalog.entries.iter().enumerate() {
            let state = self.process_entry(entry, &mut records, &mut summary).await?;

            match state {
                BookState::Recorded => summary.books_recorded += 1,
                _ => summary.books_skipped += 1,
            }

            if (index + 1) % 10 == 0 {
                tracing::info!(
                    "Progress: {}/{} books processed",
                    index + 1,
                    summary.books_discovered
                );
            }
        }

        save_records(&self.config.output.json_path, records.as_slice())?;

        tracing::info!(
            "Run completed in {:?}: {} recorded, {} skipped, {} texts, {} images",
            start_time.elapsed(),
            summary.books_recorded,
            summary.books_skipped,
            summary.texts_written,
            summary.images_written
        );

        Ok(summary)
    }

    /// Processes a single catalog entry
    ///
    /// Returns the terminal state the entry ended in. Assets are best effort:
    /// a missing image or text edition does not keep the record out of the set.
    async fn process_entry(
        &self,
        entry: &CatalogEntry,
        records: &mut RecordSet,
        summary: &mut RunSummary,
    ) -> Result<BookState, ScraperError> {
        let output = &self.config.output;
        let mut state = BookState::Fetching;
        tracing::debug!("Book {}: {}", entry.book_id, state);

        let page = match fetch_with_policy(&self.fetcher, &entry.detail_url, &[], &self.policy)
            .await
        {
            Ok(page) => page,
            Err(error) => {
                match &error {
                    FetchError::NotFound { .. } => {
                        tracing::warn!("Book {} not found: {}", entry.book_id, error)
                    }
                    FetchError::ConnectionFailure { .. } => {
                        tracing::error!("Skipping book {}: {}", entry.book_id, error)
                    }
                }
                advance(entry, state, BookState::Skipped)?;
                return Ok(BookState::Skipped);
            }
        };

        state = advance(entry, state, BookState::Parsing)?;
        let record =
            parse_book_page(&page.text(), &entry.detail_url).map_err(|source| {
                ScraperError::Parse {
                    url: entry.detail_url.to_string(),
                    source,
                }
            })?;

        if !output.skip_images || !output.skip_text {
            state = advance(entry, state, BookState::Downloading)?;
            let downloader = AssetDownloader::new(&self.fetcher, &self.policy);

            if !output.skip_images {
                match downloader
                    .download_image(&record.image_url, &output.images_dir())
                    .await
                {
                    Ok(path) => {
                        summary.images_written += 1;
                        tracing::debug!("Saved cover of {} to {}", entry.book_id, path.display());
                    }
                    Err(ScraperError::Fetch(error)) => {
                        tracing::warn!("Cover of book {} not downloaded: {}", entry.book_id, error);
                    }
                    Err(error) => return Err(error),
                }
            }

            if !output.skip_text {
                match downloader
                    .download_text(
                        &self.text_endpoint,
                        &entry.book_id,
                        &record.title,
                        &output.books_dir(),
                    )
                    .await
                {
                    Ok(path) => {
                        summary.texts_written += 1;
                        tracing::debug!("Saved text of {} to {}", entry.book_id, path.display());
                    }
                    Err(ScraperError::Fetch(error)) => {
                        tracing::warn!("Text of book {} not downloaded: {}", entry.book_id, error);
                    }
                    Err(error) => return Err(error),
                }
            }
        }

        advance(entry, state, BookState::Recorded)?;
        tracing::info!("Recorded {} by {}", record.title, record.author);
        records.push(record);

        Ok(BookState::Recorded)
    }
}

/// Moves an entry to its next state, rejecting illegal steps
fn advance(entry: &CatalogEntry, from: BookState, to: BookState) -> Result<BookState, ScraperError> {
    if !from.can_transition_to(to) {
        return Err(ScraperError::InvalidTransition { from, to });
    }

    tracing::debug!("Book {}: {} -> {}", entry.book_id, from, to);
    Ok(to)
}
