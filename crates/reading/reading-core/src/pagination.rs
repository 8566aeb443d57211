//! Paging over reading lists.

use reading_spi::{Page, Result, SensorReading, StoreError};

/// Largest page a caller may request; bigger requests are clamped.
pub const MAX_PAGE_SIZE: usize = 500;

/// Slice `items` into the requested 1-based page.
///
/// `items` is expected newest first, as returned by
/// [`ReadingStore::all`](reading_spi::ReadingStore::all). Pages past the end
/// are empty rather than an error.
pub fn paginate(items: Vec<SensorReading>, page: usize, page_size: usize) -> Result<Page> {
    if page == 0 {
        return Err(StoreError::InvalidInput(
            "page must be at least 1".to_string(),
        ));
    }
    if page_size == 0 {
        return Err(StoreError::InvalidInput(
            "page_size must be at least 1".to_string(),
        ));
    }

    let page_size = page_size.min(MAX_PAGE_SIZE);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size).min(total_items);
    let end = start.saturating_add(page_size).min(total_items);
    let items = items.into_iter().skip(start).take(end - start).collect();

    Ok(Page {
        page,
        page_size,
        total_items,
        total_pages,
        items,
    })
}

/// Every reading on a single page, for clients that page locally.
pub fn single_page(items: Vec<SensorReading>) -> Page {
    let total_items = items.len();
    Page {
        page: 1,
        page_size: total_items,
        total_items,
        total_pages: usize::from(total_items > 0),
        items,
    }
}
