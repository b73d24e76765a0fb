use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::Category;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub locator: LocatorConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Catalog host; the API root is `{base_url}/api/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Serve the catalog from a JSON fixture instead of HTTP.
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            fixture: None,
        }
    }
}

fn default_base_url() -> String {
    "https://swapi.dev".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResolutionConfig {
    /// Maximum reference fetches in flight for one entity.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Dereference sparse reference fields and show every display field.
    #[serde(default)]
    pub thorough: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            thorough: false,
        }
    }
}

fn default_concurrency() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocatorConfig {
    /// Upper bound on listing pages scanned per lookup.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Catalog listing page size. Only used for diagnostics: the page of an
    /// id is never computed from it.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            page_size: default_page_size(),
        }
    }
}

fn default_max_pages() -> u32 {
    100
}
fn default_page_size() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Categories queried when a search names none.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
        }
    }
}

fn default_categories() -> Vec<String> {
    Category::ALL.iter().map(|c| c.to_string()).collect()
}

impl SearchConfig {
    /// Parsed default categories. Validated by [`load_config`].
    pub fn default_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter_map(|c| c.parse().ok())
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.catalog.base_url.trim().is_empty() {
        anyhow::bail!("catalog.base_url must not be empty");
    }

    if config.resolution.concurrency == 0 {
        anyhow::bail!("resolution.concurrency must be >= 1");
    }

    if config.locator.max_pages == 0 {
        anyhow::bail!("locator.max_pages must be >= 1");
    }
    if config.locator.page_size == 0 {
        anyhow::bail!("locator.page_size must be >= 1");
    }

    if config.search.categories.is_empty() {
        anyhow::bail!("search.categories must name at least one category");
    }
    for category in &config.search.categories {
        if category.parse::<Category>().is_err() {
            anyhow::bail!(
                "Unknown category in search.categories: '{}'. Must be one of people, planets, starships, vehicles, species, films.",
                category
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.catalog.base_url, "https://swapi.dev");
        assert_eq!(config.resolution.concurrency, 4);
        assert_eq!(config.locator.max_pages, 100);
        assert_eq!(config.search.default_categories().len(), 6);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
[locator]
max_pages = 10

[search]
categories = ["people", "films"]
"#,
        )
        .unwrap();
        assert_eq!(config.locator.max_pages, 10);
        assert_eq!(config.locator.page_size, 10);
        assert_eq!(
            config.search.default_categories(),
            vec![Category::People, Category::Films]
        );
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let config: Config = toml::from_str("[resolution]\nconcurrency = 0\n").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_unknown_category() {
        let config: Config = toml::from_str("[search]\ncategories = [\"droids\"]\n").unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("droids"));
    }

    #[test]
    fn test_load_config_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[catalog]\nbase_url = \"http://localhost:8000\"\n").unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.catalog.base_url, "http://localhost:8000");
    }
}
