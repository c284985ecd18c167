//! Marketplace query model and pagination envelope.

use serde::{Deserialize, Serialize};

use bindery_catalog::CardFilter;

/// Sort tab selected in the marketplace UI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketTab {
    Popular,
    MostListed,
    LowestPrice,
    HighestPrice,
}

/// One marketplace query, as the engine receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketQuery {
    pub search_text: Option<String>,
    pub tab: MarketTab,
    pub filter: CardFilter,
    pub price_min_cents: Option<u64>,
    pub price_max_cents: Option<u64>,
    pub only_with_listings: bool,
    /// Zero-based page index.
    pub page: usize,
    pub page_size: usize,
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self {
            search_text: None,
            tab: MarketTab::Popular,
            filter: CardFilter::any(),
            price_min_cents: None,
            price_max_cents: None,
            only_with_listings: false,
            page: 0,
            page_size: 30,
        }
    }
}

impl MarketQuery {
    pub fn for_tab(tab: MarketTab) -> Self {
        Self {
            tab,
            ..Self::default()
        }
    }
}

/// A page of results plus the totals the UI needs for pagination controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Slice `items` down to the requested page.
    ///
    /// `total`/`total_pages` describe the full filtered set; a page index
    /// past the end yields an empty page with the totals intact.
    pub fn paginate(items: Vec<T>, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total = items.len();
        let total_pages = total.div_ceil(page_size);

        let start = page.saturating_mul(page_size);
        let items = if start >= total {
            Vec::new()
        } else {
            let mut items = items;
            items.drain(..start);
            items.truncate(page_size);
            items
        };

        Self {
            items,
            total,
            total_pages,
            page,
            page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_slices_and_counts() {
        let page = Page::paginate((0..7).collect::<Vec<_>>(), 1, 3);
        assert_eq!(page.items, vec![3, 4, 5]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn last_page_may_be_short() {
        let page = Page::paginate((0..7).collect::<Vec<_>>(), 2, 3);
        assert_eq!(page.items, vec![6]);
    }

    #[test]
    fn out_of_range_page_is_empty_with_totals() {
        let page = Page::paginate((0..7).collect::<Vec<_>>(), 9, 3);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn empty_input_has_zero_pages() {
        let page = Page::paginate(Vec::<i32>::new(), 0, 3);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: walking every page rebuilds the input exactly.
            #[test]
            fn pages_partition_the_input(len in 0usize..200, page_size in 1usize..50) {
                let items: Vec<usize> = (0..len).collect();
                let total_pages = Page::paginate(items.clone(), 0, page_size).total_pages;

                let mut rebuilt = Vec::new();
                for page in 0..total_pages {
                    let p = Page::paginate(items.clone(), page, page_size);
                    prop_assert_eq!(p.total, len);
                    rebuilt.extend(p.items);
                }
                prop_assert_eq!(rebuilt, items);
            }
        }
    }
}
