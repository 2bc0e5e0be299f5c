//! Output module for publishing the record set as a static site
//!
//! This module handles:
//! - Splitting the record set into fixed-size pages
//! - Rendering one HTML file per page
//! - Serving the rendered site over HTTP
//!
//! Each stage is a plain function; [`render_site`] chains the first two.

mod html;
mod pages;
mod server;

pub use html::{escape_html, render_page, render_pages, RenderOptions};
pub use pages::{page_file_name, paginate, RecordPage};
pub use server::{router, serve, serve_listener};

use crate::config::RenderConfig;
use crate::storage::load_records;
use std::path::{Path, PathBuf};

/// Loads the record set at `json_path` and renders it into `config.pages_dir`
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - The written page files, first page first
/// * `Err(ScraperError)` - The record set could not be read or a page not written
pub fn render_site(json_path: &Path, config: &RenderConfig) -> crate::Result<Vec<PathBuf>> {
    let records = load_records(json_path)?;
    tracing::info!(
        "Loaded {} records from {}",
        records.len(),
        json_path.display()
    );

    let pages = paginate(&records, config.books_per_page);
    let options = RenderOptions::from_config(config);
    let written = render_pages(&pages, &config.pages_dir, &options)?;

    tracing::info!(
        "Rendered {} pages into {}",
        written.len(),
        config.pages_dir.display()
    );
    Ok(written)
}
