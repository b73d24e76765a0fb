//! Entity resolution engine.
//!
//! Fetches one entity and replaces its reference fields with
//! [`ResolvedLink`]s. References are resolved through a bounded pool of
//! concurrent fetches; each result is written back into a pre-sized slot so
//! list order and field order always match the raw record.
//!
//! # Field rules
//!
//! For every field selected by [`fields_to_resolve`]:
//!
//! | Raw value | Resolved value |
//! |-----------|----------------|
//! | list | `Links` of every string element that resolves, or `Missing("N/a")` if none do |
//! | non-empty string | `Link`, or `Missing("N/a")` if the reference is unavailable |
//! | present but empty (`null`, `""`, `0`, `false`) | `Missing` with the value's textual form |
//! | absent | field stays absent |
//!
//! Fields not selected are copied verbatim.

use futures::stream::{self, StreamExt};
use serde_json::Value;

use crate::catalog::{self, CatalogClient};
use crate::error::{CatalogError, HolocronError, Result};
use crate::fields::fields_to_resolve;
use crate::models::{
    composite_id, Category, FieldValue, RawEntity, ResolvedEntity, ResolvedLink, NOT_AVAILABLE,
};
use crate::resolver;

/// Options for [`resolve_entity`].
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Also dereference the category's sparse reference fields.
    pub thorough: bool,
    /// Maximum reference fetches in flight.
    pub concurrency: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            thorough: false,
            concurrency: 4,
        }
    }
}

/// Fetch `category/id` and dereference its reference fields.
///
/// # Errors
///
/// - [`HolocronError::EntityNotFound`] if the catalog has no such record.
/// - [`HolocronError::UpstreamError`] if the entity fetch itself fails.
///
/// Unavailable references never fail the resolution; they degrade to
/// [`FieldValue::Missing`].
pub async fn resolve_entity(
    client: &dyn CatalogClient,
    category: Category,
    id: u32,
    opts: ResolveOptions,
) -> Result<ResolvedEntity> {
    let raw = catalog::fetch_entity(client, category, id)
        .await
        .map_err(|e| match e {
            CatalogError::NotFound(_) => HolocronError::EntityNotFound { category, id },
            CatalogError::Upstream(msg) => HolocronError::UpstreamError(msg),
        })?;

    Ok(resolve_raw(client, category, id, raw, opts).await)
}

/// Dereference an already-fetched record.
pub async fn resolve_raw(
    client: &dyn CatalogClient,
    category: Category,
    id: u32,
    raw: RawEntity,
    opts: ResolveOptions,
) -> ResolvedEntity {
    let selected = fields_to_resolve(category, opts.thorough);

    // One task per reference URI, tagged with its (field, position) slot.
    let mut tasks: Vec<(usize, usize, String)> = Vec::new();
    let mut fields: Vec<(String, Slot)> = Vec::with_capacity(raw.len());

    for (name, value) in raw {
        let field_index = fields.len();
        let slot = if selected.contains(&name.as_str()) {
            plan_field(value, |position, uri| {
                tasks.push((field_index, position, uri))
            })
        } else {
            Slot::Done(FieldValue::Value(value))
        };
        fields.push((name, slot));
    }

    let mut resolved: Vec<Vec<Option<ResolvedLink>>> = fields
        .iter()
        .map(|(_, slot)| match slot {
            Slot::Pending { len, .. } => vec![None; *len],
            Slot::Done(_) => Vec::new(),
        })
        .collect();

    let mut results = stream::iter(tasks)
        .map(|(field_index, position, uri)| async move {
            let outcome = resolver::resolve(client, &uri).await;
            (field_index, position, outcome)
        })
        .buffer_unordered(opts.concurrency.max(1));

    while let Some((field_index, position, outcome)) = results.next().await {
        match outcome {
            Ok(link) => resolved[field_index][position] = Some(link),
            Err(e) => tracing::warn!(%category, id, error = %e, "reference degraded to placeholder"),
        }
    }

    let fields: Vec<(String, FieldValue)> = fields
        .into_iter()
        .zip(resolved)
        .map(|((name, slot), links)| {
            let value = match slot {
                Slot::Done(value) => value,
                Slot::Pending { list, .. } => finish_field(list, links),
            };
            (name, value)
        })
        .collect();

    let mut entity = ResolvedEntity {
        category,
        id,
        composite_id: String::new(),
        fields,
    };
    entity.composite_id = composite_id(category, entity.label().unwrap_or_default());
    entity
}

/// Per-field resolution state.
enum Slot {
    Done(FieldValue),
    /// Awaiting `len` references; `list` tells whether the raw value was a list.
    Pending { len: usize, list: bool },
}

fn plan_field(value: Value, mut enqueue: impl FnMut(usize, String)) -> Slot {
    match value {
        Value::Array(items) => {
            let uris: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(uri) => Some(uri),
                    _ => None,
                })
                .collect();
            if uris.is_empty() {
                return Slot::Done(FieldValue::Missing(NOT_AVAILABLE.to_string()));
            }
            let len = uris.len();
            for (position, uri) in uris.into_iter().enumerate() {
                enqueue(position, uri);
            }
            Slot::Pending { len, list: true }
        }
        Value::String(uri) if !uri.is_empty() => {
            enqueue(0, uri);
            Slot::Pending {
                len: 1,
                list: false,
            }
        }
        other if is_empty_value(&other) => Slot::Done(FieldValue::Missing(placeholder_text(&other))),
        other => Slot::Done(FieldValue::Value(other)),
    }
}

fn finish_field(list: bool, links: Vec<Option<ResolvedLink>>) -> FieldValue {
    let mut links: Vec<ResolvedLink> = links.into_iter().flatten().collect();
    if links.is_empty() {
        FieldValue::Missing(NOT_AVAILABLE.to_string())
    } else if list {
        FieldValue::Links(links)
    } else {
        FieldValue::Link(links.swap_remove(0))
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Printable form of a present-but-empty value.
fn placeholder_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
