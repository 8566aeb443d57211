//! Paged view over stored readings.

use serde::{Deserialize, Serialize};

use super::SensorReading;

/// One page of readings, newest first.
///
/// The page number is held by the client and passed on every request; the
/// store keeps no paging state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub page: usize,
    /// Maximum number of items per page
    pub page_size: usize,
    /// Number of readings across all pages
    pub total_items: usize,
    /// Number of pages needed to hold `total_items`
    pub total_pages: usize,
    /// Readings on this page
    pub items: Vec<SensorReading>,
}

impl Page {
    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether an earlier page exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: usize, total_pages: usize) -> Page {
        Page {
            page,
            page_size: 5,
            total_items: total_pages * 5,
            total_pages,
            items: Vec::new(),
        }
    }

    #[test]
    fn test_first_page_navigation() {
        let p = page(1, 3);
        assert!(p.has_next());
        assert!(!p.has_previous());
    }

    #[test]
    fn test_last_page_navigation() {
        let p = page(3, 3);
        assert!(!p.has_next());
        assert!(p.has_previous());
    }

    #[test]
    fn test_empty_store_has_no_neighbours() {
        let p = page(1, 0);
        assert!(!p.has_next());
        assert!(!p.has_previous());
    }
}
