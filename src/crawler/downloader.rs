//! Asset downloader
//!
//! Fetches the text edition and the cover image of a book and writes them to
//! the books and images directories. Both operations overwrite their target,
//! so running them twice with the same input leaves the same file.

use crate::crawler::fetcher::{fetch_with_policy, Fetcher, RetryPolicy};
use crate::storage::write_asset;
use crate::url::{image_file_name, text_file_name, BookId};
use std::path::{Path, PathBuf};
use url::Url;

/// Downloads book assets through a [`Fetcher`]
pub struct AssetDownloader<'a, F: ?Sized> {
    fetcher: &'a F,
    policy: &'a RetryPolicy,
}

impl<'a, F> AssetDownloader<'a, F>
where
    F: Fetcher + ?Sized,
{
    pub fn new(fetcher: &'a F, policy: &'a RetryPolicy) -> Self {
        Self { fetcher, policy }
    }

    /// Downloads the text edition of a book
    ///
    /// The numeric part of `book_id` is sent as the `id` query parameter to
    /// `text_endpoint`. A redirect means the book has no text edition and is
    /// reported as `FetchError::NotFound`.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written `{sanitized title}.txt`
    /// * `Err(ScraperError::Fetch)` - The text was missing or unreachable
    /// * `Err(ScraperError::Io)` - The file could not be written
    pub async fn download_text(
        &self,
        text_endpoint: &Url,
        book_id: &BookId,
        title: &str,
        books_dir: &Path,
    ) -> crate::Result<PathBuf> {
        let id = book_id.number().to_string();
        let page = fetch_with_policy(
            self.fetcher,
            text_endpoint,
            &[("id", id.as_str())],
            self.policy,
        )
        .await?;

        let path = write_asset(books_dir, &text_file_name(title), &page.body).await?;
        Ok(path)
    }

    /// Downloads a cover image
    ///
    /// The file name is the percent-decoded final path segment of `image_url`.
    pub async fn download_image(
        &self,
        image_url: &Url,
        images_dir: &Path,
    ) -> crate::Result<PathBuf> {
        let page = fetch_with_policy(self.fetcher, image_url, &[], self.policy).await?;

        let path = write_asset(images_dir, &image_file_name(image_url), &page.body).await?;
        Ok(path)
    }
}
