//! Random quotes from a quotable-style API.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::Quote;

const SERVICE: &str = "quote service";

/// Somewhere to fetch a random quote from.
#[async_trait]
pub trait QuoteSource: Send + Sync + Debug {
    /// Fetch one random quote.
    async fn random_quote(&self) -> Result<Quote>;
}

/// Wire shape of a quotable quote.
#[derive(Debug, Deserialize)]
struct QuotableQuote {
    #[serde(rename = "_id")]
    id: String,
    content: String,
    author: String,
    #[serde(default)]
    tags: Vec<String>,
}

impl From<QuotableQuote> for Quote {
    fn from(q: QuotableQuote) -> Self {
        Self {
            id: q.id,
            text: q.content,
            author: q.author,
            category: q.tags.into_iter().next(),
        }
    }
}

/// Client for `GET {api_url}` returning one quotable quote.
#[derive(Debug)]
pub struct QuotableClient {
    http: reqwest::Client,
    url: String,
}

impl QuotableClient {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            http: super::http_client(config.quotes_timeout())?,
            url: config.quotes.api_url.clone(),
        })
    }
}

#[async_trait]
impl QuoteSource for QuotableClient {
    async fn random_quote(&self) -> Result<Quote> {
        debug!(url = %self.url, "fetching external quote");
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::upstream(SERVICE, format!("status {status}")));
        }

        let quote: QuotableQuote = response
            .json()
            .await
            .map_err(|e| Error::upstream(SERVICE, format!("invalid response: {e}")))?;
        Ok(quote.into())
    }
}

/// Used when external quotes are turned off.
#[derive(Debug, Default)]
pub struct DisabledQuoteSource;

#[async_trait]
impl QuoteSource for DisabledQuoteSource {
    async fn random_quote(&self) -> Result<Quote> {
        Err(Error::upstream(SERVICE, "external quotes are disabled"))
    }
}
