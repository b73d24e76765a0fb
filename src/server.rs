//! JSON HTTP server.
//!
//! Exposes entity resolution, page location, and search over HTTP so a
//! presentation layer can consume resolved records without embedding the
//! crate.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version and API hit count) |
//! | `GET`  | `/entries/{category}/{id}` | Resolved entity plus display fields |
//! | `GET`  | `/search?q=...` | Ranked multi-category search |
//! | `GET`  | `/locate/{category}/{id}` | Listing page containing an entity |
//!
//! `/entries` accepts `thorough`, `has_results`, and `selected` query
//! parameters mirroring [`Session`]. `/search` accepts `categories`
//! (comma-separated) and `action` (`search` or `page`).
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "entity not found: people/99", "redirect": "/search" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `page_not_found` (404),
//! `upstream` (502).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::HolocronError;
use crate::models::{Category, SearchAction, SearchTerm};
use crate::session::{Explorer, Session};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    explorer: Arc<Explorer>,
}

/// Starts the server on `[server].bind` with the configured catalog client.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let explorer = Explorer::from_config(config)?;
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("holocron server listening on http://{}", config.server.bind);
    axum::serve(listener, router(explorer)).await?;
    Ok(())
}

/// Build the router. Exposed so tests and embedding binaries can serve it
/// on their own listener.
pub fn router(explorer: Explorer) -> Router {
    let state = AppState {
        explorer: Arc::new(explorer),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/entries/{category}/{id}", get(handle_entry))
        .route("/search", get(handle_search))
        .route("/locate/{category}/{id}", get(handle_locate))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    /// Where the client should navigate instead of rendering partial data.
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    redirect: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                redirect: self.redirect,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
        redirect: None,
    }
}

impl From<HolocronError> for AppError {
    fn from(err: HolocronError) -> Self {
        let status = match &err {
            HolocronError::EntityNotFound { .. } | HolocronError::PageNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            HolocronError::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            HolocronError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            HolocronError::ReferenceUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
            redirect: err.redirect().map(String::from),
        }
    }
}

fn parse_target(category: &str, id: &str) -> Result<(Category, u32), AppError> {
    let category: Category = category.parse().map_err(AppError::from)?;
    let id: u32 = id
        .parse()
        .map_err(|_| bad_request(format!("invalid id: {}", id)))?;
    Ok((category, id))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    /// Catalog requests issued since startup.
    api_hits: u64,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        api_hits: state.explorer.client().hits(),
    })
}

// ============ GET /entries/{category}/{id} ============

#[derive(Debug, Deserialize)]
struct EntryParams {
    #[serde(default)]
    thorough: bool,
    #[serde(default)]
    has_results: bool,
    selected: Option<String>,
}

async fn handle_entry(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, String)>,
    Query(params): Query<EntryParams>,
) -> Result<Response, AppError> {
    let (category, id) = parse_target(&category, &id)?;
    let session = Session {
        selected: params.selected,
        has_search_results: params.has_results,
        thorough: params.thorough,
    };
    let view = state.explorer.open_entry(category, id, &session).await?;
    Ok(Json(view).into_response())
}

// ============ GET /search ============

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
    categories: Option<String>,
    #[serde(default)]
    action: SearchAction,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<crate::models::SearchResult>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    if params.q.trim().is_empty() {
        return Err(bad_request("q must not be empty"));
    }

    let categories = match params.categories.as_deref() {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::parse::<Category>)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let term = SearchTerm::parse(&params.q);
    let results = state
        .explorer
        .search(&categories, &term, params.action)
        .await;
    Ok(Json(SearchResponse { results }))
}

// ============ GET /locate/{category}/{id} ============

#[derive(Debug, Deserialize)]
struct LocateParams {
    max_pages: Option<u32>,
}

async fn handle_locate(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, String)>,
    Query(params): Query<LocateParams>,
) -> Result<Response, AppError> {
    let (category, id) = parse_target(&category, &id)?;
    if params.max_pages == Some(0) {
        return Err(bad_request("max_pages must be >= 1"));
    }
    let located = state.explorer.locate(category, id, params.max_pages).await?;
    Ok(Json(located).into_response())
}
