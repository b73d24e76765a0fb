//! Catalog client abstraction.
//!
//! The [`CatalogClient`] trait is the single seam between Holocron and the
//! remote read-only catalog. The core never talks HTTP directly: it builds a
//! [`CatalogPath`] and asks the client for the JSON body at that path.
//!
//! Two implementations ship with the crate:
//! - **[`HttpCatalogClient`]**: reqwest-based client for a live SWAPI-compatible API.
//! - **[`InMemoryCatalog`]**: fixture catalog for tests and offline runs.
//!
//! Retry and timeout policy belong to the client. The core performs no retries
//! and treats any [`CatalogError::Upstream`] as an upstream failure.

pub mod http;
pub mod memory;

pub use http::HttpCatalogClient;
pub use memory::InMemoryCatalog;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::error::CatalogError;
use crate::models::{Category, RawEntity, SearchAction, SearchResult};

/// A request path relative to the catalog's API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPath {
    /// Path with trailing slash, e.g. `people/1/` or `films/`.
    pub path: String,
    /// Optional single query pair, e.g. `("search", "luke")`.
    pub query: Option<(String, String)>,
}

impl CatalogPath {
    /// Path of one entity record.
    pub fn entity(category: Category, id: u32) -> Self {
        Self {
            path: format!("{}/{}/", category, id),
            query: None,
        }
    }

    /// Unfiltered first listing page of a category.
    pub fn listing(category: Category) -> Self {
        Self {
            path: format!("{}/", category),
            query: None,
        }
    }

    /// Listing filtered by `action=value`. `value` must already be sanitized.
    pub fn listing_query(category: Category, action: SearchAction, value: &str) -> Self {
        Self {
            path: format!("{}/", category),
            query: Some((action.as_str().to_string(), value.to_string())),
        }
    }
}

impl fmt::Display for CatalogPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some((key, value)) => write!(f, "{}?{}={}", self.path, key, value),
            None => f.write_str(&self.path),
        }
    }
}

/// Read-only access to the remote catalog.
///
/// Implementations must be `Send + Sync`; the core shares one client across
/// concurrent reference resolutions and per-category searches.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the JSON body at `path`.
    async fn get(&self, path: &CatalogPath) -> Result<Value, CatalogError>;

    /// Number of requests issued through this client so far.
    fn hits(&self) -> u64 {
        0
    }
}

/// Fetch one entity record.
pub async fn fetch_entity(
    client: &dyn CatalogClient,
    category: Category,
    id: u32,
) -> Result<RawEntity, CatalogError> {
    let path = CatalogPath::entity(category, id);
    tracing::debug!(%path, "fetching entity");
    match client.get(&path).await? {
        Value::Object(map) => Ok(map),
        other => Err(CatalogError::Upstream(format!(
            "expected an object at {}, got {}",
            path,
            json_kind(&other)
        ))),
    }
}

/// Fetch one listing envelope (`count`, `next`, `previous`, `results`).
pub async fn fetch_listing(
    client: &dyn CatalogClient,
    category: Category,
    path: &CatalogPath,
) -> Result<SearchResult, CatalogError> {
    tracing::debug!(%path, "fetching listing");
    let body = client.get(path).await?;
    parse_listing(category, body)
}

fn parse_listing(category: Category, body: Value) -> Result<SearchResult, CatalogError> {
    let Value::Object(mut map) = body else {
        return Err(CatalogError::Upstream(format!(
            "expected a listing object for {}",
            category
        )));
    };

    let results = match map.remove("results") {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(CatalogError::Upstream(format!(
                "listing for {} is missing its results array",
                category
            )))
        }
    };
    let count = map
        .get("count")
        .and_then(Value::as_u64)
        .unwrap_or(results.len() as u64);

    Ok(SearchResult {
        category,
        count,
        next: map.get("next").and_then(Value::as_str).map(String::from),
        previous: map
            .get("previous")
            .and_then(Value::as_str)
            .map(String::from),
        results,
    })
}

/// Convert a catalog URI to an internal path.
///
/// Strips the scheme, host, and everything up to and including the first
/// `api/`, so `https://swapi.dev/api/planets/1/` becomes `/planets/1/`.
/// Anything after the prefix, trailing slash and casing included, is kept.
pub fn internal_path(uri: &str) -> String {
    if uri.starts_with("http:") || uri.starts_with("https:") {
        if let Some(pos) = uri.find("api/") {
            return format!("/{}", &uri[pos + "api/".len()..]);
        }
    }
    uri.to_string()
}

/// Split an internal path `/<category>/<id>/` into its two segments.
pub fn split_internal_path(path: &str) -> Option<(&str, &str)> {
    let inner = path.strip_prefix('/')?.strip_suffix('/')?;
    let (category, id) = inner.split_once('/')?;
    if category.is_empty() || id.is_empty() || id.contains('/') {
        return None;
    }
    Some((category, id))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_path_shapes() {
        assert_eq!(CatalogPath::listing(Category::Films).to_string(), "films/");
        assert_eq!(
            CatalogPath::listing_query(Category::People, SearchAction::Search, "luke").to_string(),
            "people/?search=luke"
        );
        assert_eq!(
            CatalogPath::listing_query(Category::Vehicles, SearchAction::Page, "3").to_string(),
            "vehicles/?page=3"
        );
        assert_eq!(CatalogPath::entity(Category::Planets, 28).to_string(), "planets/28/");
    }

    #[test]
    fn test_internal_path_strips_host_and_api_prefix() {
        assert_eq!(internal_path("https://swapi.dev/api/planets/1/"), "/planets/1/");
        assert_eq!(internal_path("http://localhost:8000/api/films/2/"), "/films/2/");
        assert_eq!(internal_path("/species/6/"), "/species/6/");
    }

    #[test]
    fn test_split_internal_path() {
        assert_eq!(split_internal_path("/people/59/"), Some(("people", "59")));
        assert_eq!(split_internal_path("/people/59"), None);
        assert_eq!(split_internal_path("/people/"), None);
        assert_eq!(split_internal_path("/a/b/c/"), None);
    }

    #[test]
    fn test_parse_listing_defaults_count_to_page_length() {
        let body = serde_json::json!({ "results": [{ "name": "Tatooine" }] });
        let listing = parse_listing(Category::Planets, body).unwrap();
        assert_eq!(listing.count, 1);
        assert!(listing.next.is_none());
    }

    #[test]
    fn test_parse_listing_rejects_missing_results() {
        let body = serde_json::json!({ "count": 3 });
        assert!(parse_listing(Category::Planets, body).is_err());
    }
}
