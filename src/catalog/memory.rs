//! In-memory [`CatalogClient`] implementation for testing and offline runs.
//!
//! Serves SWAPI-shaped responses from entities held behind `std::sync::RwLock`.
//! Listings are ordered by id and paginated with a fixed page size, so gaps in
//! the id sequence shift entities onto later pages exactly as removals do on
//! the live catalog.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{CatalogClient, CatalogPath};
use crate::error::CatalogError;
use crate::models::Category;

/// Fixture catalog.
pub struct InMemoryCatalog {
    api_root: String,
    page_size: usize,
    entities: RwLock<BTreeMap<Category, BTreeMap<u32, Value>>>,
    failing: RwLock<HashSet<Category>>,
    requests: Mutex<Vec<String>>,
    hits: AtomicU64,
}

/// On-disk fixture layout:
/// `{ "base_url": "...", "page_size": 10, "entities": { "people": { "1": {...} } } }`.
#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default = "default_fixture_base_url")]
    base_url: String,
    #[serde(default = "default_fixture_page_size")]
    page_size: usize,
    #[serde(default)]
    entities: HashMap<Category, BTreeMap<u32, Value>>,
}

fn default_fixture_base_url() -> String {
    "https://swapi.dev".to_string()
}
fn default_fixture_page_size() -> usize {
    10
}

impl InMemoryCatalog {
    /// Create an empty catalog whose entity URLs live under `{base_url}/api/`.
    pub fn new(base_url: &str, page_size: usize) -> Self {
        Self {
            api_root: format!("{}/api/", base_url.trim_end_matches('/')),
            page_size: page_size.max(1),
            entities: RwLock::new(BTreeMap::new()),
            failing: RwLock::new(HashSet::new()),
            requests: Mutex::new(Vec::new()),
            hits: AtomicU64::new(0),
        }
    }

    /// Load a catalog from a JSON fixture file.
    pub fn from_fixture_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file: {}", path.display()))?;
        let fixture: Fixture =
            serde_json::from_str(&content).with_context(|| "Failed to parse fixture file")?;

        let catalog = Self::new(&fixture.base_url, fixture.page_size);
        for (category, entities) in fixture.entities {
            for (id, record) in entities {
                catalog.insert(category, id, record);
            }
        }
        Ok(catalog)
    }

    /// Absolute URI of an entity, as the live catalog would report it.
    pub fn uri(&self, category: Category, id: u32) -> String {
        format!("{}{}/{}/", self.api_root, category, id)
    }

    /// Insert or replace an entity. A missing `url` field is filled in.
    pub fn insert(&self, category: Category, id: u32, record: Value) {
        let mut record = match record {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        if !record.contains_key("url") {
            record.insert("url".to_string(), Value::String(self.uri(category, id)));
        }
        self.entities
            .write()
            .unwrap()
            .entry(category)
            .or_default()
            .insert(id, Value::Object(record));
    }

    /// Make every subsequent request for `category` fail as an upstream error.
    pub fn fail_category(&self, category: Category) {
        self.failing.write().unwrap().insert(category);
    }

    /// Every request served so far, rendered as `path?key=value`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn page_url(&self, category: Category, key: &str, value: &str, page: usize) -> String {
        if key == "page" {
            format!("{}{}/?page={}", self.api_root, category, page)
        } else {
            format!(
                "{}{}/?{}={}&page={}",
                self.api_root, category, key, value, page
            )
        }
    }

    fn listing(
        &self,
        category: Category,
        matches: Vec<Value>,
        page: usize,
        key: &str,
        value: &str,
    ) -> Result<Value, CatalogError> {
        let total = matches.len();
        let last_page = total.div_ceil(self.page_size).max(1);
        if page == 0 || page > last_page {
            return Err(CatalogError::NotFound(format!(
                "{}/?page={}",
                category, page
            )));
        }

        let results: Vec<Value> = matches
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect();
        let next = (page < last_page).then(|| self.page_url(category, key, value, page + 1));
        let previous = (page > 1).then(|| self.page_url(category, key, value, page - 1));

        Ok(json!({
            "count": total,
            "next": next,
            "previous": previous,
            "results": results,
        }))
    }
}

fn label_matches(record: &Value, needle: &str) -> bool {
    ["name", "title"].iter().any(|key| {
        record
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|label| label.to_lowercase().contains(needle))
    })
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn get(&self, path: &CatalogPath) -> Result<Value, CatalogError> {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().unwrap().push(path.to_string());

        let segments: Vec<&str> = path.path.split('/').filter(|s| !s.is_empty()).collect();
        let category: Category = segments
            .first()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CatalogError::NotFound(path.to_string()))?;

        if self.failing.read().unwrap().contains(&category) {
            return Err(CatalogError::Upstream(format!(
                "injected failure for {}",
                category
            )));
        }

        let entities = self.entities.read().unwrap();
        let records = entities.get(&category);

        match segments.as_slice() {
            [_, id] => {
                let id: u32 = id
                    .parse()
                    .map_err(|_| CatalogError::NotFound(path.to_string()))?;
                records
                    .and_then(|r| r.get(&id))
                    .cloned()
                    .ok_or_else(|| CatalogError::NotFound(path.to_string()))
            }
            [_] => {
                let all: Vec<Value> = records
                    .map(|r| r.values().cloned().collect())
                    .unwrap_or_default();
                match &path.query {
                    None => self.listing(category, all, 1, "page", "1"),
                    Some((key, value)) if key == "page" => {
                        let page: usize = value
                            .parse()
                            .map_err(|_| CatalogError::NotFound(path.to_string()))?;
                        self.listing(category, all, page, key, value)
                    }
                    Some((key, value)) if key == "search" => {
                        let needle = value.to_lowercase();
                        let matches = all
                            .into_iter()
                            .filter(|record| label_matches(record, &needle))
                            .collect();
                        self.listing(category, matches, 1, key, value)
                    }
                    Some(_) => Err(CatalogError::NotFound(path.to_string())),
                }
            }
            _ => Err(CatalogError::NotFound(path.to_string())),
        }
    }

    fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchAction;

    fn catalog_with_gap() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new("https://swapi.dev", 2);
        for (id, name) in [(4, "Sand Crawler"), (6, "T-16 skyhopper"), (20, "Storm IV")] {
            catalog.insert(Category::Vehicles, id, json!({ "name": name }));
        }
        catalog
    }

    #[tokio::test]
    async fn test_entity_lookup_fills_url() {
        let catalog = catalog_with_gap();
        let record = catalog
            .get(&CatalogPath::entity(Category::Vehicles, 20))
            .await
            .unwrap();
        assert_eq!(record["url"], "https://swapi.dev/api/vehicles/20/");

        let missing = catalog.get(&CatalogPath::entity(Category::Vehicles, 5)).await;
        assert!(matches!(missing, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_pages_follow_id_order_not_id_value() {
        let catalog = catalog_with_gap();
        let page2 = catalog
            .get(&CatalogPath::listing_query(Category::Vehicles, SearchAction::Page, "2"))
            .await
            .unwrap();
        assert_eq!(page2["count"], 3);
        assert_eq!(page2["results"][0]["name"], "Storm IV");
        assert!(page2["next"].is_null());

        let past_end = catalog
            .get(&CatalogPath::listing_query(Category::Vehicles, SearchAction::Page, "3"))
            .await;
        assert!(matches!(past_end, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let catalog = catalog_with_gap();
        let found = catalog
            .get(&CatalogPath::listing_query(Category::Vehicles, SearchAction::Search, "SKY"))
            .await
            .unwrap();
        assert_eq!(found["count"], 1);

        let none = catalog
            .get(&CatalogPath::listing_query(Category::Vehicles, SearchAction::Search, "falcon"))
            .await
            .unwrap();
        assert_eq!(none["count"], 0);
        assert_eq!(catalog.hits(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let catalog = catalog_with_gap();
        catalog.fail_category(Category::Vehicles);
        let result = catalog.get(&CatalogPath::listing(Category::Vehicles)).await;
        assert!(matches!(result, Err(CatalogError::Upstream(_))));
    }

    #[test]
    fn test_fixture_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"{ "page_size": 5, "entities": { "planets": { "1": { "name": "Tatooine" } } } }"#,
        )
        .unwrap();
        let catalog = InMemoryCatalog::from_fixture_file(tmp.path()).unwrap();
        assert_eq!(catalog.uri(Category::Planets, 1), "https://swapi.dev/api/planets/1/");
    }
}
