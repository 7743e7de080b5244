//! Web search with a provider fallback chain and a fingerprint-keyed cache.
//!
//! Lookups are keyed by a SHA-256 fingerprint of the normalized query, so a
//! cached result is reused regardless of which provider served it. The
//! fingerprint space is treated as collision-free.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::{millis, SearchConfig};
use crate::db::{Database, DbError};
use crate::models::{SearchCacheEntry, SearchResponse, SearchResult};
use crate::services::auth::now_ms;
use quiz_core::{normalize_query, NormalizedQuery, ValidationError};

/// Results kept per response.
pub const MAX_RESULTS: usize = 10;

/// Per-provider call budget when none is configured.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure of a single provider. Never surfaced past the fallback loop.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Parse(String),

    #[error("no answer within {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("search is unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Store(#[from] DbError),
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Tag stored with results this provider served.
    fn name(&self) -> &str;

    async fn search(&self, query: &NormalizedQuery) -> Result<Vec<SearchResult>, ProviderError>;
}

/// Cache key for a normalized query.
pub fn fingerprint(query: &NormalizedQuery) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_str().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Host of `url`, or `fallback` when it does not parse.
fn source_of(url: &str, fallback: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| fallback.to_string())
}

// === Provider A: Serper ===

pub struct SerperProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SerperResponse {
    organic: Option<Vec<SerperHit>>,
}

#[derive(Deserialize)]
struct SerperHit {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerperProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    fn name(&self) -> &str {
        "serper"
    }

    async fn search(&self, query: &NormalizedQuery) -> Result<Vec<SearchResult>, ProviderError> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", self.api_key.as_str())
            .json(&serde_json::json!({ "q": query.as_str(), "num": MAX_RESULTS }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: SerperResponse = response.json().await?;
        let organic = body
            .organic
            .ok_or_else(|| ProviderError::Parse("missing `organic` section".to_string()))?;
        Ok(organic
            .into_iter()
            .map(|hit| SearchResult {
                source: source_of(&hit.link, self.name()),
                title: hit.title,
                snippet: hit.snippet,
                url: hit.link,
            })
            .collect())
    }
}

// === Provider B: Brave ===

pub struct BraveProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct BraveResponse {
    web: Option<BraveWeb>,
}

#[derive(Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveHit>,
}

#[derive(Deserialize)]
struct BraveHit {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

impl BraveProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for BraveProvider {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(&self, query: &NormalizedQuery) -> Result<Vec<SearchResult>, ProviderError> {
        let count = MAX_RESULTS.to_string();
        let response = self
            .client
            .get(format!("{}/res/v1/web/search", self.base_url))
            .header("X-Subscription-Token", self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("q", query.as_str()), ("count", count.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: BraveResponse = response.json().await?;
        let web = body
            .web
            .ok_or_else(|| ProviderError::Parse("missing `web` section".to_string()))?;
        Ok(web
            .results
            .into_iter()
            .map(|hit| SearchResult {
                source: source_of(&hit.url, self.name()),
                title: hit.title,
                snippet: hit.description,
                url: hit.url,
            })
            .collect())
    }
}

// === Service ===

pub struct SearchService {
    db: Arc<Database>,
    providers: Vec<Box<dyn SearchProvider>>,
    ttl: Duration,
    timeout: Duration,
    missing: Vec<&'static str>,
}

impl SearchService {
    /// Service over an explicit provider chain, tried in order.
    pub fn new(db: Arc<Database>, providers: Vec<Box<dyn SearchProvider>>, ttl: Duration) -> Self {
        Self {
            db,
            providers,
            ttl,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            missing: Vec::new(),
        }
    }

    /// Bound each provider call to `timeout`; a late provider counts as failed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Serper first, then Brave, each only when its API key is configured.
    pub fn from_config(db: Arc<Database>, config: &SearchConfig) -> Result<Self, reqwest::Error> {
        let mut providers: Vec<Box<dyn SearchProvider>> = Vec::new();
        let mut missing = Vec::new();

        match &config.serper_api_key {
            Some(key) => providers.push(Box::new(SerperProvider::new(
                &config.serper_base_url,
                key,
                config.timeout,
            )?)),
            None => missing.push("SERPER_API_KEY"),
        }
        match &config.brave_api_key {
            Some(key) => providers.push(Box::new(BraveProvider::new(
                &config.brave_base_url,
                key,
                config.timeout,
            )?)),
            None => missing.push("BRAVE_API_KEY"),
        }

        if providers.is_empty() {
            tracing::warn!("No search provider configured, set SERPER_API_KEY or BRAVE_API_KEY");
        }

        Ok(Self {
            db,
            providers,
            ttl: config.cache_ttl,
            timeout: config.timeout,
            missing,
        })
    }

    pub async fn search(&self, raw: &str) -> Result<SearchResponse, SearchError> {
        self.search_at(raw, now_ms()).await
    }

    /// Search as of `now_ms`. The store is never locked across a provider call.
    pub async fn search_at(&self, raw: &str, now_ms: i64) -> Result<SearchResponse, SearchError> {
        let query = normalize_query(raw)?;
        let key = fingerprint(&query);

        if let Some(hit) = self.cached(&key, now_ms)? {
            tracing::debug!(query = query.as_str(), provider = %hit.provider, "Search cache hit");
            return Ok(hit);
        }
        tracing::debug!(query = query.as_str(), "Search cache miss");

        for provider in &self.providers {
            let outcome = tokio::time::timeout(self.timeout, provider.search(&query))
                .await
                .unwrap_or(Err(ProviderError::Timeout(self.timeout)));
            match outcome {
                Ok(mut results) => {
                    results.truncate(MAX_RESULTS);
                    let response = SearchResponse {
                        results,
                        provider: provider.name().to_string(),
                        cached: false,
                    };
                    self.store(&key, &query, &response, now_ms)?;
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), "Search provider failed: {}", e);
                }
            }
        }

        Err(SearchError::Unavailable(self.unavailable_reason()))
    }

    fn cached(&self, key: &str, now_ms: i64) -> Result<Option<SearchResponse>, SearchError> {
        let entry = match self.db.get_cache_entry(key)? {
            Some(entry) if entry.expires_at_ms > now_ms => entry,
            _ => return Ok(None),
        };
        match serde_json::from_str::<SearchResponse>(&entry.payload) {
            Ok(mut response) => {
                response.cached = true;
                Ok(Some(response))
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry {}: {}", key, e);
                Ok(None)
            }
        }
    }

    fn store(
        &self,
        key: &str,
        query: &NormalizedQuery,
        response: &SearchResponse,
        now_ms: i64,
    ) -> Result<(), SearchError> {
        let payload = serde_json::to_string(response)
            .map_err(|e| DbError::InvalidData(e.to_string()))?;
        self.db.upsert_cache_entry(&SearchCacheEntry {
            fingerprint: key.to_string(),
            query: query.as_str().to_string(),
            provider: response.provider.clone(),
            payload,
            expires_at_ms: now_ms.saturating_add(millis(self.ttl)),
        })?;
        Ok(())
    }

    fn unavailable_reason(&self) -> String {
        if self.providers.is_empty() {
            format!("no provider configured, set {}", self.missing.join(" or "))
        } else if self.missing.is_empty() {
            "all configured providers failed".to_string()
        } else {
            format!(
                "all configured providers failed, {} not set",
                self.missing.join(" and ")
            )
        }
    }
}
