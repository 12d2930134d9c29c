//! Retrieval of storefront `products.json` feeds.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;

use crate::domain::types::StorefrontUrl;

/// Errors raised while retrieving a feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not complete.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    /// The body is not JSON or has no `products` array.
    #[error("unexpected feed body from {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// Source of raw product records for a storefront URL.
pub trait FeedFetcher {
    fn fetch_products(&self, url: &StorefrontUrl) -> Result<Vec<Value>, FetchError>;
}

/// Blocking HTTP implementation of [`FeedFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// The underlying client, reused for spreadsheet calls.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl FeedFetcher for HttpFeedFetcher {
    fn fetch_products(&self, url: &StorefrontUrl) -> Result<Vec<Value>, FetchError> {
        let network = |source| FetchError::Network {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.as_str()).send().map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().map_err(network)?;

        parse_feed(&body).map_err(|reason| FetchError::Parse {
            url: url.to_string(),
            reason,
        })
    }
}

/// Extracts the `products` array from a feed body.
pub fn parse_feed(body: &str) -> Result<Vec<Value>, String> {
    let mut document: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    match document.get_mut("products").map(Value::take) {
        Some(Value::Array(products)) => Ok(products),
        Some(_) => Err("`products` is not an array".to_string()),
        None => Err("missing `products` key".to_string()),
    }
}
