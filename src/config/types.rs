use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Tululu-Scraper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Catalog crawl configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Base URL of the site, without a trailing slash
    #[serde(rename = "site-url")]
    pub site_url: String,

    /// Path segment of the category listing
    #[serde(rename = "category-path")]
    pub category_path: String,

    /// First catalog page to fetch
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Catalog page at which the walk stops (never fetched itself)
    #[serde(rename = "end-page")]
    pub end_page: u32,

    /// Pause after a connection failure (seconds)
    #[serde(rename = "backoff-secs")]
    pub backoff_secs: u64,

    /// Re-fetch the same URL after the backoff instead of moving on
    #[serde(rename = "retry-on-connection-failure")]
    pub retry_on_connection_failure: bool,

    /// Re-fetch attempts per URL when retrying is enabled
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Per-request transport timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl CrawlerConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            site_url: "https://tululu.org".to_string(),
            category_path: "l55".to_string(),
            start_page: 1,
            end_page: 10,
            backoff_secs: 20,
            retry_on_connection_failure: false,
            max_retries: 3,
            request_timeout_secs: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "tululu-scraper".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding the `books` and `images` subdirectories
    #[serde(rename = "dest-folder")]
    pub dest_folder: PathBuf,

    /// Path of the JSON record set
    #[serde(rename = "json-path")]
    pub json_path: PathBuf,

    /// Do not download cover images
    #[serde(rename = "skip-images")]
    pub skip_images: bool,

    /// Do not download text editions
    #[serde(rename = "skip-text")]
    pub skip_text: bool,
}

impl OutputConfig {
    pub fn books_dir(&self) -> PathBuf {
        self.dest_folder.join("books")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.dest_folder.join("images")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dest_folder: PathBuf::from("Folder"),
            json_path: PathBuf::from("data.json"),
            skip_images: false,
            skip_text: false,
        }
    }
}

/// Static page rendering and serving configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory the `index{n}.html` pages are written to
    #[serde(rename = "pages-dir")]
    pub pages_dir: PathBuf,

    /// Books shown on one page
    #[serde(rename = "books-per-page")]
    pub books_per_page: usize,

    /// Books shown side by side in one row
    pub columns: usize,

    /// Prefix linking the pages to the downloaded images and books
    #[serde(rename = "media-prefix")]
    pub media_prefix: String,

    /// Address the static server listens on
    #[serde(rename = "bind-address")]
    pub bind_address: String,

    /// Directory served over HTTP
    #[serde(rename = "serve-root")]
    pub serve_root: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pages_dir: PathBuf::from("Pages"),
            books_per_page: 10,
            columns: 2,
            media_prefix: "../Folder".to_string(),
            bind_address: "0.0.0.0:8000".to_string(),
            serve_root: PathBuf::from("."),
        }
    }
}
