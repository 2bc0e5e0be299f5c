//! Configuration module for Tululu-Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so running without a file is equivalent to loading
//! an empty document.
//!
//! # Example
//!
//! ```no_run
//! use tululu_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tululu.toml")).unwrap();
//! println!("Crawling pages {}..{}", config.crawler.start_page, config.crawler.end_page);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, RenderConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
