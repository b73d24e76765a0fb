//! Reference resolution: one catalog URI in, one [`ResolvedLink`] out.

use serde_json::Value;

use crate::catalog::{self, internal_path, split_internal_path, CatalogClient};
use crate::error::{CatalogError, HolocronError, Result};
use crate::models::{Category, ResolvedLink};

/// Label the catalog uses for homeworld/species records with no known value.
const UNKNOWN_LABEL: &str = "unknown";

/// Resolve a reference URI to its display label and internal path.
///
/// The internal path is the URI with its scheme, host, and API prefix
/// stripped (`https://swapi.dev/api/planets/1/` → `/planets/1/`). The label is
/// the target's `name`, falling back to `title`; the catalog's `"unknown"`
/// placeholder is upper-cased so it reads as deliberate.
///
/// # Errors
///
/// [`HolocronError::ReferenceUnavailable`] when the URI does not point at a
/// catalog entity, the fetch fails, or the target has neither `name` nor
/// `title`.
pub async fn resolve(client: &dyn CatalogClient, uri: &str) -> Result<ResolvedLink> {
    let unavailable = |reason: String| HolocronError::ReferenceUnavailable {
        uri: uri.to_string(),
        reason,
    };

    let path = internal_path(uri);
    let (category, id) =
        split_internal_path(&path).ok_or_else(|| unavailable("not a catalog entity path".into()))?;
    let category: Category = category
        .parse()
        .map_err(|_| unavailable(format!("unknown category '{}'", category)))?;
    let id: u32 = id
        .parse()
        .map_err(|_| unavailable(format!("invalid id '{}'", id)))?;

    let record = catalog::fetch_entity(client, category, id)
        .await
        .map_err(|e| match e {
            CatalogError::NotFound(_) => unavailable("not found".into()),
            CatalogError::Upstream(msg) => unavailable(msg),
        })?;

    let label = ["name", "title"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .ok_or_else(|| unavailable("record has neither name nor title".into()))?;

    Ok(ResolvedLink {
        label: display_label(label),
        path,
    })
}

fn display_label(label: &str) -> String {
    if label == UNKNOWN_LABEL {
        label.to_uppercase()
    } else {
        label.to_string()
    }
}
