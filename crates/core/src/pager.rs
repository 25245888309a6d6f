//! Client-side pagination over an already-filtered list.

use crate::constants::DEFAULT_PAGE_SIZE;
use std::num::NonZeroUsize;

/// One page of a filtered list.
#[derive(Debug, PartialEq)]
pub struct Page<'a, E> {
    pub items: &'a [E],
    /// 1-based index after clamping.
    pub page_index: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<E> Page<'_, E> {
    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.total_pages
    }
}

/// Number of pages needed for `len` items; an empty list still has one page.
pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get()).max(1)
}

/// Clamps a requested 1-based page index into `[1, total_pages]`.
pub fn clamp_index(requested: i64, total_pages: usize) -> usize {
    if requested < 1 {
        return 1;
    }
    usize::try_from(requested)
        .unwrap_or(usize::MAX)
        .min(total_pages.max(1))
}

/// Slices `filtered` into the page at `page_index`.
///
/// Any index is accepted: values below 1 select the first page and values past the end
/// select the last one. Every record of `filtered` appears on exactly one page.
pub fn page<E>(filtered: &[E], page_index: i64, page_size: NonZeroUsize) -> Page<'_, E> {
    let total_items = filtered.len();
    let total_pages = total_pages(total_items, page_size);
    let page_index = clamp_index(page_index, total_pages);

    let start = ((page_index - 1) * page_size.get()).min(total_items);
    let end = start.saturating_add(page_size.get()).min(total_items);

    Page {
        items: &filtered[start..end],
        page_index,
        total_pages,
        total_items,
    }
}

/// The page a view has asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageCursor {
    index: usize,
    size: NonZeroUsize,
}

impl PageCursor {
    pub fn new(size: NonZeroUsize) -> Self {
        Self { index: 1, size }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> NonZeroUsize {
        self.size
    }

    /// Moves to `index`, clamped against a list of `len` items.
    pub fn go_to(&mut self, index: i64, len: usize) {
        self.index = clamp_index(index, total_pages(len, self.size));
    }

    /// Changes the page size and returns to the first page.
    pub fn set_size(&mut self, size: NonZeroUsize) {
        self.size = size;
        self.index = 1;
    }

    /// Pulls the index back into range after the list shrank.
    pub fn clamp(&mut self, len: usize) {
        self.index = clamp_index(self.index as i64, total_pages(len, self.size));
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero size")
    }

    fn records(n: u64) -> Vec<u64> {
        (1..=n).collect()
    }

    #[test]
    fn test_twelve_records_in_pages_of_five() {
        let list = records(12);

        let first = page(&list, 1, size(5));
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items, &[1, 2, 3, 4, 5]);
        assert!(!first.has_previous());
        assert!(first.has_next());

        let past_end = page(&list, 10, size(5));
        assert_eq!(past_end.page_index, 3);
        assert_eq!(past_end.items, &[11, 12]);
        assert!(!past_end.has_next());
    }

    #[test]
    fn test_index_below_one_clamps_to_first_page() {
        let list = records(12);
        for requested in [0, -1, i64::MIN] {
            let p = page(&list, requested, size(5));
            assert_eq!(p.page_index, 1);
            assert_eq!(p.items, &[1, 2, 3, 4, 5]);
        }
        assert_eq!(page(&list, i64::MAX, size(5)).page_index, 3);
    }

    #[test]
    fn test_empty_list_has_one_empty_page() {
        let list: Vec<u64> = Vec::new();
        let p = page(&list, 4, size(10));
        assert_eq!(p.page_index, 1);
        assert_eq!(p.total_pages, 1);
        assert!(p.items.is_empty());
    }

    #[test]
    fn test_pages_cover_every_record_exactly_once() {
        for len in [0u64, 1, 4, 5, 6, 23, 100] {
            for n in [1usize, 3, 5, 10, 50] {
                let list = records(len);
                let pages = total_pages(list.len(), size(n));

                let mut seen = Vec::new();
                for i in 1..=pages {
                    let p = page(&list, i as i64, size(n));
                    assert!(p.items.len() <= n);
                    if !list.is_empty() {
                        assert!(!p.items.is_empty(), "len={len} size={n} page={i}");
                    }
                    seen.extend_from_slice(p.items);
                }
                assert_eq!(seen, list, "len={len} size={n}");
            }
        }
    }

    #[test]
    fn test_cursor_resets_on_size_change_and_clamps_on_shrink() {
        let mut cursor = PageCursor::new(size(5));
        cursor.go_to(3, 12);
        assert_eq!(cursor.index(), 3);

        cursor.clamp(7);
        assert_eq!(cursor.index(), 2);

        cursor.set_size(size(20));
        assert_eq!(cursor.index(), 1);
        assert_eq!(cursor.size().get(), 20);

        cursor.go_to(-4, 100);
        assert_eq!(cursor.index(), 1);
    }
}
