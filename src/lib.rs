//! # Holocron
//!
//! Display-ready views over a remote, read-only, richly cross-referenced
//! catalog (people, planets, starships, vehicles, species, films).
//!
//! The catalog serves records whose fields point at other records by URI,
//! and paginates listings in a way that does not map linearly onto ids
//! (removed entries leave gaps). Holocron covers three problems:
//!
//! - **Entity resolution**: fetch a record and replace every reference field
//!   with labelled internal links, preserving field and list order.
//! - **Category location**: find which listing page contains an id by
//!   scanning pages in order up to a configured bound.
//! - **Search aggregation**: query several categories concurrently, sanitize
//!   the term, and rank categories by match count.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   CLI/HTTP   │──▶│   Explorer   │──▶│ entry/locator│
//! │ (holo/axum)  │   │  (session)   │   │   /search    │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              ▼
//!                                      ┌──────────────┐
//!                                      │CatalogClient │
//!                                      │ HTTP/memory  │
//!                                      └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Catalog client trait, HTTP and in-memory clients |
//! | [`config`] | TOML configuration parsing |
//! | [`entry`] | Entity resolution engine |
//! | [`error`] | Error taxonomy |
//! | [`fields`] | Display and sparse-reference field tables |
//! | [`locator`] | Listing page locator |
//! | [`models`] | Core data types |
//! | [`resolver`] | Single reference resolution |
//! | [`search`] | Multi-category search aggregation |
//! | [`server`] | JSON HTTP server |
//! | [`session`] | Entry dispatch across the components |

pub mod catalog;
pub mod config;
pub mod entry;
pub mod error;
pub mod fields;
pub mod locator;
pub mod models;
pub mod resolver;
pub mod search;
pub mod server;
pub mod session;
