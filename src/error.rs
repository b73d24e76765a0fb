//! Error types for the catalog client seam and the resolution core.

use thiserror::Error;

use crate::models::Category;

/// Route every unrecovered error sends the user back to.
pub const FALLBACK_ROUTE: &str = "/search";

/// Failure reported by a [`CatalogClient`](crate::catalog::CatalogClient).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog answered 404 for the path.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport, timeout, server-side, or decoding failure.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Upstream(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Upstream(format!("invalid JSON: {}", e))
    }
}

/// Errors produced by resolution, location, and search.
#[derive(Debug, Error)]
pub enum HolocronError {
    /// The requested entity has no record.
    #[error("entity not found: {category}/{id}")]
    EntityNotFound { category: Category, id: u32 },

    /// A cross-referenced entity could not be resolved.
    #[error("reference unavailable: {uri}: {reason}")]
    ReferenceUnavailable { uri: String, reason: String },

    /// The locator scanned its whole bound without finding the target.
    #[error("no page of {category} within {pages_fetched} page(s) contains id {id}")]
    PageNotFound {
        category: Category,
        id: u32,
        pages_fetched: u32,
    },

    /// Transport or availability failure, distinct from "not found".
    #[error("upstream error: {0}")]
    UpstreamError(String),

    #[error("unknown category: {0}")]
    InvalidCategory(String),
}

impl HolocronError {
    /// Where the caller should navigate instead of rendering partial data.
    ///
    /// `ReferenceUnavailable` is recovered per field and never reaches the
    /// caller, so it has no redirect.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            HolocronError::ReferenceUnavailable { .. } => None,
            _ => Some(FALLBACK_ROUTE),
        }
    }

    /// Stable machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            HolocronError::EntityNotFound { .. } => "not_found",
            HolocronError::ReferenceUnavailable { .. } => "reference_unavailable",
            HolocronError::PageNotFound { .. } => "page_not_found",
            HolocronError::UpstreamError(_) => "upstream",
            HolocronError::InvalidCategory(_) => "bad_request",
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, HolocronError>;
