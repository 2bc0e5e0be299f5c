//! Catalog crawler
//!
//! Walks the paginated category listing and collects one [`CatalogEntry`] per
//! book row, in catalog order.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{fetch_with_policy, Fetcher, RetryPolicy};
use crate::url::{catalog_page_url, resolve, BookId, CatalogEntry};
use crate::FetchError;
use scraper::{Html, Selector};
use url::Url;

/// Outcome of a catalog walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogCrawl {
    /// Entries in catalog order, pages in ascending order
    pub entries: Vec<CatalogEntry>,
    /// Pages that were fetched and parsed
    pub pages_fetched: u32,
    /// Pages that were missing, redirected or unreachable
    pub pages_skipped: u32,
}

/// Walks catalog pages of one category
#[derive(Debug, Clone)]
pub struct CatalogCrawler {
    site_url: String,
    category_path: String,
}

impl CatalogCrawler {
    pub fn new(site_url: impl Into<String>, category_path: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            category_path: category_path.into(),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(&config.site_url, &config.category_path)
    }

    /// Crawls pages `start_page..end_page`
    ///
    /// `end_page` itself is never fetched. Missing pages are logged and
    /// skipped; an unreachable page costs one backoff (see [`RetryPolicy`])
    /// and is then skipped as well.
    ///
    /// # Returns
    ///
    /// * `Ok(CatalogCrawl)` - The entries found and per-page counts
    /// * `Err(ScraperError)` - A page URL could not be built from the site URL
    pub async fn crawl<F>(
        &self,
        fetcher: &F,
        policy: &RetryPolicy,
        start_page: u32,
        end_page: u32,
    ) -> crate::Result<CatalogCrawl>
    where
        F: Fetcher + ?Sized,
    {
        let mut crawl = CatalogCrawl::default();

        for page_number in start_page..end_page {
            let page_url = catalog_page_url(&self.site_url, &self.category_path, page_number)?;

            let page = match fetch_with_policy(fetcher, &page_url, &[], policy).await {
                Ok(page) => page,
                Err(error @ FetchError::NotFound { .. }) => {
                    tracing::warn!("Catalog page {} not found: {}", page_number, error);
                    crawl.pages_skipped += 1;
                    continue;
                }
                Err(error) => {
                    tracing::error!("Skipping catalog page {}: {}", page_number, error);
                    crawl.pages_skipped += 1;
                    continue;
                }
            };

            let entries = extract_catalog_entries(&page.text(), &page_url);
            tracing::info!(
                "Catalog page {}: {} books",
                page_number,
                entries.len()
            );

            crawl.entries.extend(entries);
            crawl.pages_fetched += 1;
        }

        Ok(crawl)
    }
}

/// Extracts the book rows of one catalog page
///
/// Each `table.d_book` contributes the first link inside it. Links are resolved
/// against `page_url`; links whose first path segment does not carry a book id
/// are skipped with a warning.
pub fn extract_catalog_entries(html: &str, page_url: &Url) -> Vec<CatalogEntry> {
    let document = Html::parse_document(html);

    let (Ok(row_selector), Ok(link_selector)) =
        (Selector::parse("table.d_book"), Selector::parse("a[href]"))
    else {
        return Vec::new();
    };

    let mut entries = Vec::new();

    for row in document.select(&row_selector) {
        let Some(href) = row
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
        else {
            tracing::debug!("Book row without a link on {}", page_url);
            continue;
        };

        let detail_url = match resolve(page_url, href) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot resolve book link {:?} on {}: {}", href, page_url, e);
                continue;
            }
        };

        match BookId::from_href(href, page_url) {
            Ok(book_id) => entries.push(CatalogEntry {
                detail_url,
                book_id,
            }),
            Err(e) => {
                tracing::warn!("Skipping book link {:?} on {}: {}", href, page_url, e);
            }
        }
    }

    entries
}
