//! # Holocron CLI (`holo`)
//!
//! Resolve cross-referenced catalog entities, find which listing page holds
//! an entity, and search several categories at once.
//!
//! ## Usage
//!
//! ```bash
//! holo --config ./config/holo.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `holo entry <category> <id>` | Resolve and print one entity |
//! | `holo search "<term>"` | Search categories, ranked by match count |
//! | `holo locate <category> <id>` | Find the listing page containing an entity |
//! | `holo fields <category>` | Print the display fields for a category |
//! | `holo serve` | Start the JSON HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! holo entry people 1 --thorough
//! holo search "[show all]" --category films
//! holo search 3 --category vehicles --page
//! holo locate vehicles 20 --max-pages 10
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=holocron=debug` to see every catalog request.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use holocron::config::{self, Config};
use holocron::fields::DisplayFieldSet;
use holocron::models::{Category, SearchAction, SearchTerm};
use holocron::server;
use holocron::session::{Explorer, Session};

const DEFAULT_CONFIG: &str = "./config/holo.toml";

/// Holocron CLI: resolve, locate, and search catalog entities.
#[derive(Parser)]
#[command(
    name = "holo",
    about = "Holocron: cross-referenced entity resolution and search over a read-only catalog API",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When the default path does not exist, built-in defaults are used.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Override `catalog.base_url` (e.g. `https://swapi.dev`).
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an entity and print its display fields.
    Entry {
        category: Category,
        id: u32,

        /// Dereference sparse reference fields and show every field.
        #[arg(long)]
        thorough: bool,

        /// Also locate the listing page containing the entity.
        #[arg(long)]
        locate: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Search one or more categories.
    ///
    /// Use `"[show all]"` as the term to list each category's first page.
    Search {
        term: String,

        /// Category to search; repeat for several. Defaults to `search.categories`.
        #[arg(long = "category")]
        categories: Vec<Category>,

        /// Treat the term as a page number rather than free text.
        #[arg(long)]
        page: bool,

        #[arg(long)]
        json: bool,
    },

    /// Find the listing page that contains an entity.
    Locate {
        category: Category,
        id: u32,

        /// Scan bound; defaults to `locator.max_pages`.
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Print the display fields configured for a category.
    Fields {
        category: Category,

        #[arg(long)]
        thorough: bool,
    },

    /// Start the JSON HTTP server on `server.bind`.
    Serve,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "holocron=info,holo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(path: &Path, api: Option<String>) -> Result<Config> {
    let mut cfg = if path == Path::new(DEFAULT_CONFIG) && !path.exists() {
        Config::default()
    } else {
        config::load_config(path)?
    };
    if let Some(api) = api {
        cfg.catalog.base_url = api;
        config::validate(&cfg)?;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Entry {
            category,
            id,
            thorough,
            locate,
            json,
        } => {
            let cfg = load(&cli.config, cli.api)?;
            let explorer = Explorer::from_config(&cfg)?;
            let session = Session {
                selected: None,
                has_search_results: !locate,
                thorough: thorough || cfg.resolution.thorough,
            };
            let view = explorer.open_entry(category, id, &session).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("--- {} ---", view.entity.composite_id);
                for field in &view.fields {
                    if let Some(value) = view.entity.get(field) {
                        println!("{:<24} {}", field, value.display_text());
                    }
                }
                if let Some(located) = &view.located {
                    println!();
                    println!(
                        "listing page: {} ({} page(s) scanned)",
                        located.page, located.pages_fetched
                    );
                }
            }
            tracing::debug!(api_hits = explorer.client().hits(), "done");
        }
        Commands::Search {
            term,
            categories,
            page,
            json,
        } => {
            let explorer = Explorer::from_config(&load(&cli.config, cli.api)?)?;
            let action = if page {
                SearchAction::Page
            } else {
                SearchAction::Search
            };
            let results = explorer
                .search(&categories, &SearchTerm::parse(&term), action)
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results.");
            } else {
                for result in &results {
                    println!("{} ({})", result.category, result.count);
                    for item in &result.results {
                        let label = item
                            .get("name")
                            .or_else(|| item.get("title"))
                            .and_then(|v| v.as_str())
                            .unwrap_or("(unnamed)");
                        let url = item.get("url").and_then(|v| v.as_str()).unwrap_or("");
                        println!("    {}  {}", label, holocron::catalog::internal_path(url));
                    }
                }
            }
            tracing::debug!(api_hits = explorer.client().hits(), "done");
        }
        Commands::Locate {
            category,
            id,
            max_pages,
        } => {
            let explorer = Explorer::from_config(&load(&cli.config, cli.api)?)?;
            let located = explorer.locate(category, id, max_pages).await?;
            println!(
                "{}/{}/ is on page {} ({} page(s) scanned)",
                category, id, located.page, located.pages_fetched
            );
            tracing::debug!(api_hits = explorer.client().hits(), "done");
        }
        Commands::Fields { category, thorough } => {
            for field in DisplayFieldSet::for_category(category).display_fields(thorough) {
                println!("{}", field);
            }
        }
        Commands::Serve => {
            let cfg = load(&cli.config, cli.api)?;
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
