//! Multi-category search aggregation.
//!
//! Queries every requested category concurrently, tolerates per-category
//! failures, orders films by episode, drops empty categories, and ranks the
//! rest by match count (most populous first).

use futures::future::join_all;
use serde_json::Value;

use crate::catalog::{self, CatalogClient, CatalogPath};
use crate::models::{Category, SearchAction, SearchResult, SearchTerm};

/// Build the listing request for one category.
pub fn listing_path(category: Category, term: &SearchTerm, action: SearchAction) -> CatalogPath {
    match term {
        SearchTerm::ShowAll => CatalogPath::listing(category),
        SearchTerm::Text(text) => CatalogPath::listing_query(category, action, &sanitize_term(text)),
    }
}

/// Search `categories` for `term`.
///
/// A category whose fetch fails is logged and left out; if every category
/// fails the result is empty, which callers treat as "no matches".
pub async fn search(
    client: &dyn CatalogClient,
    categories: &[Category],
    term: &SearchTerm,
    action: SearchAction,
) -> Vec<SearchResult> {
    let fetches = categories.iter().map(|&category| async move {
        let path = listing_path(category, term, action);
        match catalog::fetch_listing(client, category, &path).await {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!(%category, %path, error = %e, "category search failed; skipping");
                None
            }
        }
    });

    let mut results: Vec<SearchResult> = join_all(fetches)
        .await
        .into_iter()
        .flatten()
        .filter(|listing| listing.count > 0)
        .collect();

    for listing in &mut results {
        if listing.category == Category::Films {
            sort_by_episode(&mut listing.results);
        }
    }

    results.sort_by(|a, b| b.count.cmp(&a.count));
    results
}

/// Films carry a meaningful order of their own; items without an
/// `episode_id` sort last.
fn sort_by_episode(items: &mut [Value]) {
    items.sort_by_key(|item| {
        item.get("episode_id")
            .and_then(Value::as_u64)
            .unwrap_or(u64::MAX)
    });
}

/// Make a user-supplied term safe to place in a listing query.
///
/// Removes `"` and `?`, strips markup tags (dropping the contents of
/// `<script>` and `<style>` elements), drops stray angle brackets while
/// keeping the text around them, and trims surrounding whitespace.
pub fn sanitize_term(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' if !opens_tag(rest) => rest = &rest[1..],
            '<' => match rest.find('>') {
                Some(end) => {
                    let tag = rest[1..end].trim().to_ascii_lowercase();
                    rest = &rest[end + 1..];
                    if let Some(element) = ["script", "style"]
                        .into_iter()
                        .find(|name| tag_name(&tag) == *name)
                    {
                        rest = skip_element_body(rest, element);
                    }
                }
                None => rest = &rest[1..],
            },
            '>' | '"' | '?' => rest = &rest[1..],
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    out.trim().to_string()
}

/// A `<` starts markup only when followed by a letter, `/`, or `!`.
fn opens_tag(rest: &str) -> bool {
    rest[1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

fn tag_name(tag: &str) -> &str {
    tag.split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
}

/// Skip past the closing tag of `element`, or to the end if it never closes.
fn skip_element_body<'a>(rest: &'a str, element: &str) -> &'a str {
    let closing = format!("</{}", element);
    match rest.to_ascii_lowercase().find(&closing) {
        Some(start) => match rest[start..].find('>') {
            Some(end) => &rest[start + end + 1..],
            None => "",
        },
        None => "",
    }
}
