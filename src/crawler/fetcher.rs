//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - GET requests with optional query parameters
//! - Classifying redirects and non-2xx statuses as "not found"
//! - Backoff (and optional retry) after connection failures
//!
//! # Response Classification
//!
//! | Condition | Result |
//! |-----------|--------|
//! | HTTP 2xx | Success |
//! | HTTP 3xx | NotFound (the site redirects ids it does not know) |
//! | Any other status | NotFound |
//! | Timeout, DNS, refused, reset | ConnectionFailure |
//! | Body read error | ConnectionFailure |

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::{FetchError, FetchResult, NotFoundReason};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::LOCATION, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// A successfully fetched, non-redirected response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the response was served from, query included
    pub url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Raw response body
    pub body: Bytes,
}

impl FetchedPage {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Anything that can perform a GET and classify the outcome
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` with the given query parameters appended
    async fn fetch(&self, url: &Url, query: &[(&str, &str)]) -> FetchResult<FetchedPage>;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed: a redirect response is how the site says a
/// resource does not exist, so the fetcher must see the 3xx itself.
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Whole-request timeout
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// The production fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from the crawler and user agent configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(
            user_agent,
            crawler.request_timeout(),
        )?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, query: &[(&str, &str)]) -> FetchResult<FetchedPage> {
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| connection_failure(url.as_str(), &e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            return Err(FetchError::NotFound {
                url: final_url.to_string(),
                reason: NotFoundReason::Redirect {
                    status: status.as_u16(),
                    location,
                },
            });
        }

        if !status.is_success() {
            return Err(FetchError::NotFound {
                url: final_url.to_string(),
                reason: NotFoundReason::Status(status.as_u16()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| connection_failure(final_url.as_str(), &e))?;

        Ok(FetchedPage {
            url: final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}

/// Classifies a transport-level reqwest error
fn connection_failure(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection refused: {}", error)
    } else {
        error.to_string()
    };

    FetchError::ConnectionFailure {
        url: url.to_string(),
        message,
    }
}

/// What to do after a connection failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause after every connection failure
    pub backoff: Duration,
    /// Re-fetch the same URL after the pause instead of giving up
    pub retry: bool,
    /// Re-fetch attempts when `retry` is set
    pub max_retries: u32,
}

impl RetryPolicy {
    /// Back off once, then move on
    pub fn skip_after(backoff: Duration) -> Self {
        Self {
            backoff,
            retry: false,
            max_retries: 0,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            backoff: config.backoff(),
            retry: config.retry_on_connection_failure,
            max_retries: config.max_retries,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::skip_after(Duration::from_secs(20))
    }
}

/// Fetches a URL, backing off after connection failures
///
/// A `NotFound` is returned immediately. A `ConnectionFailure` is followed by
/// the policy's backoff; the error is then returned, or the same URL is
/// fetched again while retry attempts remain.
pub async fn fetch_with_policy<F>(
    fetcher: &F,
    url: &Url,
    query: &[(&str, &str)],
    policy: &RetryPolicy,
) -> FetchResult<FetchedPage>
where
    F: Fetcher + ?Sized,
{
    let mut retries = 0;

    loop {
        match fetcher.fetch(url, query).await {
            Err(error @ FetchError::ConnectionFailure { .. }) => {
                tracing::error!(
                    "{}; reconnecting to the server in {:?}",
                    error,
                    policy.backoff
                );
                tokio::time::sleep(policy.backoff).await;

                if policy.retry && retries < policy.max_retries {
                    retries += 1;
                    tracing::info!(
                        "Retrying {} (attempt {}/{})",
                        url,
                        retries,
                        policy.max_retries
                    );
                    continue;
                }

                return Err(error);
            }
            result => return result,
        }
    }
}
