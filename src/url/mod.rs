//! URL handling module for Tululu-Scraper
//!
//! This module builds the site's fixed endpoints, extracts typed book ids from
//! catalog links, and derives safe local filenames from titles and image URLs.

mod book_id;
mod filename;

pub use book_id::{BookId, CatalogEntry};
pub use filename::{image_file_name, sanitize_filename, text_file_name};

use ::url::Url;

/// Endpoint serving the plain-text edition of a book
pub const TEXT_ENDPOINT: &str = "txt.php";

/// Builds the URL of one catalog page: `{site}/{category}/{page}`
///
/// # Examples
///
/// ```
/// use tululu_scraper::url::catalog_page_url;
///
/// let url = catalog_page_url("https://tululu.org", "l55", 3).unwrap();
/// assert_eq!(url.as_str(), "https://tululu.org/l55/3");
/// ```
pub fn catalog_page_url(site_url: &str, category: &str, page: u32) -> Result<Url, ::url::ParseError> {
    Url::parse(&format!(
        "{}/{}/{}",
        site_url.trim_end_matches('/'),
        category.trim_matches('/'),
        page
    ))
}

/// Builds the URL of the text endpoint, without its `id` query parameter
pub fn text_endpoint_url(site_url: &str) -> Result<Url, ::url::ParseError> {
    Url::parse(&format!(
        "{}/{}",
        site_url.trim_end_matches('/'),
        TEXT_ENDPOINT
    ))
}

/// Resolves an href found on `base` into an absolute URL
pub fn resolve(base: &Url, href: &str) -> Result<Url, ::url::ParseError> {
    base.join(href.trim())
}
