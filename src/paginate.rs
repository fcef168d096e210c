//! Pagination arithmetic for listing pages. A listing over `count` items with
//! a page size of `N` has `ceil(count / N)` pages; page `i` holds the items at
//! offsets `i*N` up to (but excluding) `min((i+1)*N, count)`.

use std::{num::NonZeroUsize, ops::Range};

/// One page of a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSlice {
    /// The zero-based page index.
    pub index: usize,

    /// The offset of the first item on the page.
    pub skip: usize,

    /// The number of items on the page.
    pub len: usize,

    /// The total number of pages in the listing.
    pub num_pages: usize,
}

impl PageSlice {
    /// The range of item offsets on this page.
    pub fn range(&self) -> Range<usize> {
        self.skip..self.skip + self.len
    }

    /// The human-facing (one-based) page number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.num_pages
    }
}

/// Returns the number of pages needed for `count` items.
pub fn num_pages(count: usize, page_size: NonZeroUsize) -> usize {
    let page_size = page_size.get();
    match count % page_size {
        0 => count / page_size,
        _ => count / page_size + 1,
    }
}

/// Plans the pages of a listing over `count` items. An empty listing has no
/// pages at all, and a `count` that is a multiple of `page_size` has no empty
/// trailing page.
pub fn plan(count: usize, page_size: NonZeroUsize) -> Vec<PageSlice> {
    let num_pages = num_pages(count, page_size);
    (0..num_pages)
        .map(|index| {
            let skip = index * page_size.get();
            PageSlice {
                index,
                skip,
                len: page_size.get().min(count - skip),
                num_pages,
            }
        })
        .collect()
}

/// Returns the route for the page at `index` of the listing mounted at
/// `base`. The first page lives at `base` itself and page `i > 0` lives at
/// `{base}/{i + 1}` (e.g., `/blog`, `/blog/2`, `/blog/3`).
pub fn page_path(base: &str, index: usize) -> String {
    match index {
        0 => base.to_owned(),
        _ => format!("{}/{}", base.trim_end_matches('/'), index + 1),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_thirteen_items_six_per_page() {
        let pages = plan(13, size(6));
        assert_eq!(3, pages.len());
        assert_eq!(
            vec![6, 6, 1],
            pages.iter().map(|p| p.len).collect::<Vec<_>>()
        );
        assert_eq!(0..6, pages[0].range());
        assert_eq!(6..12, pages[1].range());
        assert_eq!(12..13, pages[2].range());
        assert!(pages.iter().all(|p| p.num_pages == 3));
        assert!(pages[0].is_first() && !pages[0].is_last());
        assert!(pages[2].is_last());
        assert_eq!(3, pages[2].number());
    }

    #[test]
    fn test_empty() {
        assert!(plan(0, size(6)).is_empty());
        assert_eq!(0, num_pages(0, size(6)));
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_page() {
        let pages = plan(12, size(6));
        assert_eq!(2, pages.len());
        assert_eq!(6, pages[1].len);
    }

    #[test]
    fn test_pages_cover_every_item_once() {
        for count in 0..40 {
            for n in 1..9 {
                let pages = plan(count, size(n));
                assert_eq!((count + n - 1) / n, pages.len());
                let offsets: Vec<usize> =
                    pages.iter().flat_map(|p| p.range()).collect();
                assert_eq!((0..count).collect::<Vec<_>>(), offsets);
            }
        }
    }

    #[test]
    fn test_page_path() {
        assert_eq!("/my2cents", page_path("/my2cents", 0));
        assert_eq!("/my2cents/2", page_path("/my2cents", 1));
        assert_eq!("/my2cents/3", page_path("/my2cents/", 2));
        assert_eq!("/2", page_path("/", 1));
    }
}
