use serde::Serialize;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// One page of an already computed result list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    /// 1-based page number as requested
    pub current_page: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Slicing over result lists. Pure: any page number is accepted, out-of-range
/// pages are simply empty.
pub struct ResultPager;

impl ResultPager {
    /// Page `page_number` (1-based) of `results`, `items_per_page` per page.
    ///
    /// An `items_per_page` of zero falls back to [`DEFAULT_ITEMS_PER_PAGE`].
    ///
    /// Page 0 is the view before the first page: no items, `has_prev` false and
    /// `has_next` true whenever there are results.
    pub fn page<T: Clone>(results: &[T], page_number: usize, items_per_page: usize) -> PageView<T> {
        let per_page = if items_per_page == 0 {
            DEFAULT_ITEMS_PER_PAGE
        } else {
            items_per_page
        };

        let total_pages = results.len().div_ceil(per_page);
        let start = page_number
            .saturating_sub(1)
            .saturating_mul(per_page)
            .min(results.len());
        let end = start.saturating_add(per_page).min(results.len());

        // page 0 has nothing before it and shows nothing
        let items = if page_number == 0 {
            Vec::new()
        } else {
            results[start..end].to_vec()
        };

        PageView {
            items,
            current_page: page_number,
            total_pages,
            has_next: page_number < total_pages,
            has_prev: page_number > 1,
        }
    }
}
