//! Tululu-Scraper: a book catalog crawler
//!
//! This crate walks the paginated category listing of a book site, follows each
//! entry to its detail page, downloads the plain-text edition and the cover image,
//! and collects the parsed metadata into a JSON record set. A small rendering stage
//! turns the record set into paginated static HTML pages and serves them.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Tululu-Scraper operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Detail page parse error for {url}: {source}")]
    Parse { url: String, source: ParseError },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::BookState,
        to: state::BookState,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Why a response was classified as missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The server answered with a non-2xx, non-3xx status
    Status(u16),
    /// The server answered with a redirect
    Redirect { status: u16, location: Option<String> },
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Redirect {
                status,
                location: Some(location),
            } => write!(f, "redirect {} to {}", status, location),
            Self::Redirect { status, .. } => write!(f, "redirect {}", status),
        }
    }
}

/// Errors produced by a single fetch
///
/// Callers only distinguish the two variants. The reason carried by `NotFound`
/// exists for log lines.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Not found: {url} ({reason})")]
    NotFound { url: String, reason: NotFoundReason },

    #[error("Connection failure for {url}: {message}")]
    ConnectionFailure { url: String, message: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailure { .. })
    }
}

/// Structural problems in a detail page
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("cover image element not found")]
    MissingCoverImage,

    #[error("heading not found")]
    MissingHeading,

    #[error("heading {0:?} has no ' :: ' delimiter")]
    MissingDelimiter(String),

    #[error("cannot resolve {href:?}: {message}")]
    BadUrl { href: String, message: String },
}

/// Catalog path segments that do not carry a book id
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookIdError {
    #[error("empty path segment")]
    Empty,

    #[error("segment {0:?} has no numeric part after its prefix")]
    NotNumeric(String),
}

/// Result type alias for Tululu-Scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::state::BookState;
pub use crate::storage::{BookRecord, RecordSet};
pub use crate::url::{BookId, CatalogEntry};
