//! Card database API client
//!
//! HTTP client for the external card database with global request pacing.
//! The upstream service asks for a minimum delay between requests rather
//! than a quota, so pacing is a single mutex-guarded timestamp, not a
//! token bucket.

use crate::models::{CardIdentifier, ScryfallCard, ScryfallSet};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

/// Card database client errors
#[derive(Debug, Error)]
pub enum ScryfallError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Batch lookup response: matched printings plus the identifiers the
/// database could not resolve
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionResponse {
    #[serde(default)]
    pub data: Vec<ScryfallCard>,
    #[serde(default)]
    pub not_found: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    data: Vec<ScryfallCard>,
    #[serde(default)]
    has_more: bool,
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SetPage {
    #[serde(default)]
    data: Vec<ScryfallSet>,
    #[serde(default)]
    has_more: bool,
    next_page: Option<String>,
}

/// Capability interface over the external card database
///
/// The lookup pipeline only ever talks to this trait, so integration tests
/// run against an in-process stub instead of the network.
#[async_trait]
pub trait CardDatabase: Send + Sync {
    /// Batch identifier lookup
    async fn collection(
        &self,
        identifiers: &[CardIdentifier],
    ) -> Result<CollectionResponse, ScryfallError>;

    /// Free-text search with structured filters; returns all printings
    /// matching the query (empty when nothing matches)
    async fn search(&self, query: &str) -> Result<Vec<ScryfallCard>, ScryfallError>;

    /// The canonical set list
    async fn sets(&self) -> Result<Vec<ScryfallSet>, ScryfallError>;
}

/// Rate limiter enforcing a minimum delay between consecutive requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the pacing rule
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::trace!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// HTTP client for the card database
pub struct ScryfallClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl ScryfallClient {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
        rate_limit_ms: u64,
    ) -> Result<Self, ScryfallError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ScryfallError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::new(rate_limit_ms)),
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ScryfallError> {
        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ScryfallError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScryfallError::Api(status.as_u16(), error_text));
        }
        Ok(response)
    }
}

#[async_trait]
impl CardDatabase for ScryfallClient {
    async fn collection(
        &self,
        identifiers: &[CardIdentifier],
    ) -> Result<CollectionResponse, ScryfallError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/cards/collection", self.base_url);
        let body = json!({ "identifiers": identifiers });

        tracing::debug!(count = identifiers.len(), "Batch collection lookup");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScryfallError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;
        response
            .json::<CollectionResponse>()
            .await
            .map_err(|e| ScryfallError::Parse(e.to_string()))
    }

    async fn search(&self, query: &str) -> Result<Vec<ScryfallCard>, ScryfallError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/cards/search", self.base_url);

        tracing::debug!(query = %query, "Card search");

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", query), ("unique", "prints")])
            .send()
            .await
            .map_err(|e| ScryfallError::Network(e.to_string()))?;

        // The search endpoint answers "no matches" with 404
        if response.status().as_u16() == 404 {
            return Ok(Vec::new());
        }

        let response = Self::check_status(response).await?;
        let page = response
            .json::<SearchPage>()
            .await
            .map_err(|e| ScryfallError::Parse(e.to_string()))?;

        // One page is plenty: disambiguation callers only care whether the
        // hit is unique, and >175 hits is never unique
        if page.has_more {
            tracing::debug!(query = %query, "Search has further pages; using first page only");
        }

        Ok(page.data)
    }

    async fn sets(&self) -> Result<Vec<ScryfallSet>, ScryfallError> {
        let mut url = format!("{}/sets", self.base_url);
        let mut sets = Vec::new();

        loop {
            self.rate_limiter.wait().await;

            let response = self
                .http_client
                .get(&url)
                .send()
                .await
                .map_err(|e| ScryfallError::Network(e.to_string()))?;

            let response = Self::check_status(response).await?;
            let page = response
                .json::<SetPage>()
                .await
                .map_err(|e| ScryfallError::Parse(e.to_string()))?;

            sets.extend(page.data);

            match (page.has_more, page.next_page) {
                (true, Some(next)) => url = next,
                _ => break,
            }
        }

        tracing::info!(count = sets.len(), "Loaded canonical set list");
        Ok(sets)
    }
}
