//! Remote catalog access
//!
//! Thin reqwest layer over the public book-catalog API. Services depend on
//! the [`CatalogFetch`] trait rather than the client so they can be tested
//! against mocks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::{
    config::{CatalogConfig, HttpConfig},
    error::{AppError, AppResult},
    models::{
        book::{SubjectPayload, WorkPayload},
        BookSummary, CoverSize, WorkKey,
    },
};

/// Read access to the remote catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogFetch: Send + Sync {
    /// Work summaries for one subject, capped at `limit`.
    async fn subject_works(&self, subject: &str, limit: usize) -> AppResult<Vec<BookSummary>>;

    /// Raw work payload for a work key.
    async fn work(&self, key: &WorkKey) -> AppResult<WorkPayload>;

    /// Display name for an author id (path prefix already stripped).
    async fn author_name(&self, author_id: &str) -> AppResult<String>;

    /// Cover image bytes by numeric cover id.
    async fn cover(&self, cover_id: i64, size: CoverSize) -> AppResult<Vec<u8>>;

    /// Cover image bytes by cover-edition OLID (subject listings carry these).
    async fn edition_cover(&self, olid: &str, size: CoverSize) -> AppResult<Vec<u8>>;
}

/// HTTP client for the public catalog.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base: String,
    covers: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig, http_config: &HttpConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(http_config.timeout_secs))
            .user_agent(http_config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(http, config))
    }

    /// Build on an existing client (shared connection pool).
    pub fn with_client(http: reqwest::Client, config: &CatalogConfig) -> Self {
        Self {
            http,
            base: config.base_url.trim_end_matches('/').to_string(),
            covers: config.covers_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_bytes(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl CatalogFetch for CatalogClient {
    async fn subject_works(&self, subject: &str, limit: usize) -> AppResult<Vec<BookSummary>> {
        let url = format!("{}/subjects/{}.json?limit={}", self.base, subject, limit);
        let payload: SubjectPayload = self.get_json(&url).await?;
        Ok(payload
            .works
            .into_iter()
            .filter_map(|work| work.into_summary())
            .collect())
    }

    async fn work(&self, key: &WorkKey) -> AppResult<WorkPayload> {
        let url = format!("{}{}.json", self.base, key);
        // A key that does not form a valid URL settles as a failed fetch.
        Url::parse(&url)
            .map_err(|_| AppError::BadRequest(format!("invalid work key: {}", key)))?;
        self.get_json(&url).await
    }

    async fn author_name(&self, author_id: &str) -> AppResult<String> {
        let url = format!("{}/authors/{}.json", self.base, author_id);
        let payload: crate::models::AuthorPayload = self.get_json(&url).await?;
        payload
            .name
            .ok_or_else(|| AppError::NotFound(format!("author {} has no name", author_id)))
    }

    async fn cover(&self, cover_id: i64, size: CoverSize) -> AppResult<Vec<u8>> {
        let url = format!("{}/b/id/{}-{}.jpg", self.covers, cover_id, size.as_str());
        self.get_bytes(&url).await
    }

    async fn edition_cover(&self, olid: &str, size: CoverSize) -> AppResult<Vec<u8>> {
        let url = format!("{}/b/olid/{}-{}.jpg", self.covers, olid, size.as_str());
        self.get_bytes(&url).await
    }
}
