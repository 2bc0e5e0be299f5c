use crate::config::types::{Config, CrawlerConfig, OutputConfig, RenderConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_render_config(&config.render)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.site_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "site_url must use http or https, got '{}'",
            config.site_url
        )));
    }

    if config.category_path.trim_matches('/').is_empty() {
        return Err(ConfigError::Validation(
            "category_path cannot be empty".to_string(),
        ));
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start_page must be >= 1, got {}",
            config.start_page
        )));
    }

    // An empty range is allowed, a reversed one is a typo
    if config.end_page < config.start_page {
        return Err(ConfigError::Validation(format!(
            "end_page ({}) must not be less than start_page ({})",
            config.end_page, config.start_page
        )));
    }

    if config.retry_on_connection_failure && config.max_retries < 1 {
        return Err(ConfigError::Validation(
            "max_retries must be >= 1 when retry_on_connection_failure is set".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.dest_folder.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "dest_folder cannot be empty".to_string(),
        ));
    }

    if config.json_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "json_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates render configuration
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    if config.pages_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "pages_dir cannot be empty".to_string(),
        ));
    }

    if config.books_per_page < 1 {
        return Err(ConfigError::Validation(format!(
            "books_per_page must be >= 1, got {}",
            config.books_per_page
        )));
    }

    if config.columns < 1 {
        return Err(ConfigError::Validation(format!(
            "columns must be >= 1, got {}",
            config.columns
        )));
    }

    config
        .bind_address
        .parse::<std::net::SocketAddr>()
        .map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid bind_address '{}': {}",
                config.bind_address, e
            ))
        })?;

    Ok(())
}
