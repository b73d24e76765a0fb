//! Entry dispatch: the control flow behind "show category X, id Y".
//!
//! [`Explorer`] owns a catalog client and the resolution settings, and wires
//! the components together the way a viewer needs them:
//!
//! 1. Resolve the entity ([`entry::resolve_entity`]).
//! 2. Compute the display field list ([`DisplayFieldSet`]).
//! 3. If the caller holds no search results for the category (a direct hit),
//!    locate the listing page containing the entity ([`locator::locate_page`]).
//! 4. Report whether the entity is the one already selected.
//!
//! Any error from these steps means the caller should navigate to
//! [`HolocronError::redirect`] instead of rendering partial data.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{CatalogClient, HttpCatalogClient, InMemoryCatalog};
use crate::config::Config;
use crate::entry::{self, ResolveOptions};
use crate::error::Result;
use crate::fields::DisplayFieldSet;
use crate::locator;
use crate::models::{Category, LocatedPage, ResolvedEntity, SearchAction, SearchResult, SearchTerm};
use crate::search;

/// What the caller already knows about the current browsing session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Composite identifier of the currently selected entity, if any.
    pub selected: Option<String>,
    /// The caller already holds non-empty search results for this category.
    pub has_search_results: bool,
    /// Resolve and display in thorough mode.
    pub thorough: bool,
}

/// Everything a viewer needs to render one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub entity: ResolvedEntity,
    /// Field names to display, in order.
    pub fields: Vec<&'static str>,
    /// The listing page holding the entity; only set on direct hits.
    pub located: Option<LocatedPage>,
    /// The entity's composite id equals the session's current selection.
    pub already_selected: bool,
}

/// Facade over the resolution engine, locator, and search aggregator.
#[derive(Clone)]
pub struct Explorer {
    client: Arc<dyn CatalogClient>,
    concurrency: usize,
    max_pages: u32,
    page_size: u32,
    default_categories: Vec<Category>,
}

impl Explorer {
    pub fn new(client: Arc<dyn CatalogClient>, config: &Config) -> Self {
        Self {
            client,
            concurrency: config.resolution.concurrency,
            max_pages: config.locator.max_pages,
            page_size: config.locator.page_size,
            default_categories: config.search.default_categories(),
        }
    }

    /// Build the catalog client named by `[catalog]`: the JSON fixture when
    /// one is configured, the live API otherwise.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client: Arc<dyn CatalogClient> = match &config.catalog.fixture {
            Some(path) => Arc::new(InMemoryCatalog::from_fixture_file(path)?),
            None => Arc::new(HttpCatalogClient::new(&config.catalog)?),
        };
        Ok(Self::new(client, config))
    }

    pub fn client(&self) -> &dyn CatalogClient {
        self.client.as_ref()
    }

    pub fn default_categories(&self) -> &[Category] {
        &self.default_categories
    }

    pub async fn resolve(&self, category: Category, id: u32, thorough: bool) -> Result<ResolvedEntity> {
        let opts = ResolveOptions {
            thorough,
            concurrency: self.concurrency,
        };
        entry::resolve_entity(self.client(), category, id, opts).await
    }

    /// Locate with the configured bound, or `max_pages` when given.
    pub async fn locate(&self, category: Category, id: u32, max_pages: Option<u32>) -> Result<LocatedPage> {
        let bound = max_pages.unwrap_or(self.max_pages);
        let located = locator::locate_page(self.client(), category, id, bound).await?;
        let naive = locator::naive_page(id, self.page_size);
        if naive != located.page {
            tracing::debug!(%category, id, naive, actual = located.page, "listing gaps shifted entity");
        }
        Ok(located)
    }

    pub async fn search(
        &self,
        categories: &[Category],
        term: &SearchTerm,
        action: SearchAction,
    ) -> Vec<SearchResult> {
        let categories = if categories.is_empty() {
            &self.default_categories[..]
        } else {
            categories
        };
        search::search(self.client(), categories, term, action).await
    }

    /// Resolve an entity for display within `session`.
    pub async fn open_entry(&self, category: Category, id: u32, session: &Session) -> Result<EntryView> {
        let entity = self.resolve(category, id, session.thorough).await?;

        let located = if session.has_search_results {
            None
        } else {
            Some(self.locate(category, id, None).await?)
        };

        let already_selected = session.selected.as_deref() == Some(entity.composite_id.as_str());
        let fields = DisplayFieldSet::for_category(category).display_fields(session.thorough);

        Ok(EntryView {
            entity,
            fields,
            located,
            already_selected,
        })
    }
}
