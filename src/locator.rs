//! Category locator.
//!
//! Finds which listing page of a category contains a given id. Removed
//! entries leave gaps in the id sequence, so `ceil(id / page_size)` is only a
//! lower-bound guess; the locator walks pages in increasing order and tests
//! membership instead.

use crate::catalog::{self, internal_path, CatalogClient, CatalogPath};
use crate::error::{CatalogError, HolocronError, Result};
use crate::models::{Category, LocatedPage, SearchAction, SearchResult};

/// Transient state of one scan.
#[derive(Debug)]
struct ScanState {
    page: u32,
    target: String,
    bound: u32,
}

impl ScanState {
    fn new(category: Category, id: u32, bound: u32) -> Self {
        Self {
            page: 1,
            target: format!("/{}/{}/", category, id),
            bound,
        }
    }

    fn contains_target(&self, listing: &SearchResult) -> bool {
        listing.results.iter().any(|item| {
            item.get("url")
                .and_then(|url| url.as_str())
                .is_some_and(|url| internal_path(url).ends_with(&self.target))
        })
    }
}

/// Scan `category`'s listing pages `1..=bound` for the page containing `id`.
///
/// Returns the first matching page along with its listing and the number of
/// pages fetched. The scan also stops early, with
/// [`HolocronError::PageNotFound`], when the catalog reports the last page
/// (`next` is null) or answers 404 for a page past the end.
///
/// # Errors
///
/// - [`HolocronError::PageNotFound`] if no scanned page contains the id.
/// - [`HolocronError::UpstreamError`] if a page fetch fails outright.
pub async fn locate_page(
    client: &dyn CatalogClient,
    category: Category,
    id: u32,
    bound: u32,
) -> Result<LocatedPage> {
    let mut scan = ScanState::new(category, id, bound);
    let mut pages_fetched = 0;

    while scan.page <= scan.bound {
        let path = CatalogPath::listing_query(category, SearchAction::Page, &scan.page.to_string());
        let listing = match catalog::fetch_listing(client, category, &path).await {
            Ok(listing) => listing,
            Err(CatalogError::NotFound(_)) => {
                pages_fetched += 1;
                break;
            }
            Err(CatalogError::Upstream(msg)) => return Err(HolocronError::UpstreamError(msg)),
        };
        pages_fetched += 1;

        if scan.contains_target(&listing) {
            tracing::info!(%category, id, page = scan.page, pages_fetched, "located listing page");
            return Ok(LocatedPage {
                page: scan.page,
                pages_fetched,
                listing,
            });
        }

        if listing.next.is_none() {
            break;
        }
        scan.page += 1;
    }

    tracing::info!(%category, id, pages_fetched, "id not found on any listing page");
    Err(HolocronError::PageNotFound {
        category,
        id,
        pages_fetched,
    })
}

/// The page an id would sit on if the category had no gaps.
///
/// Never used to answer a lookup; useful for reporting how far removals
/// have shifted an entity.
pub fn naive_page(id: u32, page_size: u32) -> u32 {
    id.div_ceil(page_size.max(1)).max(1)
}
