//! HTTP catalog client backed by reqwest.
//!
//! # Retry Strategy
//!
//! - HTTP 404 → [`CatalogError::NotFound`], never retried
//! - HTTP 429 and 5xx → retry
//! - Other 4xx → fail immediately
//! - Network errors and timeouts → retry
//! - Backoff: 1s, 2s, 4s, 8s, ... (capped at 2^5)

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{CatalogClient, CatalogPath};
use crate::config::CatalogConfig;
use crate::error::CatalogError;

/// Client for a live SWAPI-compatible API.
pub struct HttpCatalogClient {
    client: Client,
    /// API root with trailing slash, e.g. `https://swapi.dev/api/`.
    api_root: String,
    max_retries: u32,
    hits: AtomicU64,
}

impl HttpCatalogClient {
    /// Build a client from the `[catalog]` config section.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "X-Requested-With",
            header::HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_root: api_root(&config.base_url),
            max_retries: config.max_retries,
            hits: AtomicU64::new(0),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }
}

/// `https://swapi.dev` → `https://swapi.dev/api/`.
fn api_root(base_url: &str) -> String {
    format!("{}/api/", base_url.trim_end_matches('/'))
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn get(&self, path: &CatalogPath) -> Result<Value, CatalogError> {
        let url = format!("{}{}", self.api_root, path.path);
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(%path, attempt, ?delay, "retrying catalog request");
                tokio::time::sleep(delay).await;
            }

            self.hits.fetch_add(1, Ordering::Relaxed);
            let mut request = self.client.get(&url);
            if let Some((key, value)) = &path.query {
                request = request.query(&[(key.as_str(), value.as_str())]);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let bytes = response.bytes().await?;
                        return Ok(serde_json::from_slice(&bytes)?);
                    }

                    if status == StatusCode::NOT_FOUND {
                        return Err(CatalogError::NotFound(path.to_string()));
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = CatalogError::Upstream(format!(
                        "catalog returned {} for {}: {}",
                        status, path, body_text
                    ));

                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        last_err = Some(err);
                        continue;
                    }

                    return Err(err);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            CatalogError::Upstream(format!("request for {} failed after retries", path))
        }))
    }

    fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}
