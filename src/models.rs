//! Core data models used throughout Holocron.
//!
//! These types represent the catalog entities, resolved links, and search
//! results that flow between the catalog client, the resolution engine, the
//! category locator, and the search aggregator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HolocronError;

/// Placeholder stored for reference fields that could not be resolved.
pub const NOT_AVAILABLE: &str = "N/a";

/// Term the catalog UI uses to request a category's unfiltered first listing.
pub const SHOW_ALL: &str = "[show all]";

/// Raw entity record as served by the catalog, in upstream field order.
pub type RawEntity = serde_json::Map<String, serde_json::Value>;

/// One of the fixed catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    People,
    Planets,
    Starships,
    Vehicles,
    Species,
    Films,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::People,
        Category::Planets,
        Category::Starships,
        Category::Vehicles,
        Category::Species,
        Category::Films,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::People => "people",
            Category::Planets => "planets",
            Category::Starships => "starships",
            Category::Vehicles => "vehicles",
            Category::Species => "species",
            Category::Films => "films",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = HolocronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| HolocronError::InvalidCategory(s.to_string()))
    }
}

/// A dereferenced cross-reference: display label plus internal path
/// (e.g. `/planets/1/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    pub label: String,
    pub path: String,
}

/// Value of one field in a [`ResolvedEntity`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Non-reference field, copied verbatim from the raw record.
    Value(serde_json::Value),
    /// Single reference, resolved.
    Link(ResolvedLink),
    /// Reference list, resolved in original order.
    Links(Vec<ResolvedLink>),
    /// Requested field with nothing to show; carries the printable placeholder.
    Missing(String),
}

impl FieldValue {
    /// Plain-text rendering used by the CLI.
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Value(serde_json::Value::String(s)) => s.clone(),
            FieldValue::Value(v) => v.to_string(),
            FieldValue::Link(link) => link.label.clone(),
            FieldValue::Links(links) => links
                .iter()
                .map(|l| l.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Missing(placeholder) => placeholder.clone(),
        }
    }
}

/// A fully dereferenced, display-ready entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEntity {
    pub category: Category,
    pub id: u32,
    /// `category-slugified-title`, stable across resolutions.
    pub composite_id: String,
    /// Fields in the raw record's order.
    #[serde(serialize_with = "serialize_fields")]
    pub fields: Vec<(String, FieldValue)>,
}

fn serialize_fields<S>(fields: &[(String, FieldValue)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (name, value) in fields {
        map.serialize_entry(name, value)?;
    }
    map.end()
}

impl ResolvedEntity {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// The entity's `title`, falling back to `name`.
    pub fn label(&self) -> Option<&str> {
        ["title", "name"].into_iter().find_map(|key| match self.get(key) {
            Some(FieldValue::Value(serde_json::Value::String(s))) => Some(s.as_str()),
            _ => None,
        })
    }
}

/// Derive the composite identifier for an entity.
///
/// Lower-cases the label and replaces every space with a hyphen; no other
/// characters are touched.
pub fn composite_id(category: Category, title_or_name: &str) -> String {
    format!(
        "{}-{}",
        category,
        title_or_name.replace(' ', "-").to_lowercase()
    )
}

/// One category's slice of a search or a listing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub category: Category,
    /// Upstream `count`: total matches for the query, not the page length.
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<serde_json::Value>,
}

/// Query term for the search aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// Fetch the category's first listing page unfiltered.
    ShowAll,
    Text(String),
}

impl SearchTerm {
    pub fn parse(raw: &str) -> Self {
        if raw == SHOW_ALL {
            SearchTerm::ShowAll
        } else {
            SearchTerm::Text(raw.to_string())
        }
    }
}

/// Listing query parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchAction {
    /// Free-text search over name/title.
    #[default]
    Search,
    /// Explicit 1-based page number.
    Page,
}

impl SearchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchAction::Search => "search",
            SearchAction::Page => "page",
        }
    }
}

impl FromStr for SearchAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(SearchAction::Search),
            "page" => Ok(SearchAction::Page),
            other => Err(format!("unknown search action: {}", other)),
        }
    }
}

/// Outcome of a successful category locator scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedPage {
    pub page: u32,
    /// Number of listing pages fetched, including the hit.
    pub pages_fetched: u32,
    pub listing: SearchResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_id_from_title() {
        assert_eq!(composite_id(Category::Films, "Star Wars"), "films-star-wars");
    }

    #[test]
    fn test_composite_id_only_replaces_spaces() {
        assert_eq!(
            composite_id(Category::People, "Obi-Wan Kenobi"),
            "people-obi-wan-kenobi"
        );
        assert_eq!(composite_id(Category::Starships, "X-wing"), "starships-x-wing");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("vehicles".parse::<Category>().unwrap(), Category::Vehicles);
        assert!("droids".parse::<Category>().is_err());
        assert!("People".parse::<Category>().is_err());
    }

    #[test]
    fn test_search_term_sentinel() {
        assert_eq!(SearchTerm::parse("[show all]"), SearchTerm::ShowAll);
        assert_eq!(
            SearchTerm::parse("show all"),
            SearchTerm::Text("show all".to_string())
        );
    }

    #[test]
    fn test_display_text_joins_links() {
        let value = FieldValue::Links(vec![
            ResolvedLink {
                label: "A New Hope".into(),
                path: "/films/1/".into(),
            },
            ResolvedLink {
                label: "The Empire Strikes Back".into(),
                path: "/films/2/".into(),
            },
        ]);
        assert_eq!(value.display_text(), "A New Hope, The Empire Strikes Back");
        assert_eq!(
            FieldValue::Value(serde_json::json!(172)).display_text(),
            "172"
        );
    }
}
