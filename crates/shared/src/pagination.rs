//! Page arithmetic over an in-memory result list.
//!
//! Pages are 1-based. Out-of-range requests clip to the available items
//! instead of failing, and cursor movement clamps at both ends.

use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: usize = 9;

/// Returns the items on `page_index`, i.e. `[(page_index - 1) * page_size, page_index * page_size)`
/// clipped to `items`. A zero page index or page size yields an empty slice.
pub fn paginate<T>(items: &[T], page_index: usize, page_size: usize) -> &[T] {
    if page_index == 0 || page_size == 0 {
        return &[];
    }
    let start = (page_index - 1).saturating_mul(page_size).min(items.len());
    let end = page_index.saturating_mul(page_size).min(items.len());
    &items[start..end]
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    page_index: usize,
    page_size: usize,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl PageCursor {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.page_size)
    }

    pub fn page<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.page_index, self.page_size)
    }

    pub fn reset(&mut self) {
        self.page_index = 1;
    }

    pub fn next(&mut self, len: usize) -> usize {
        self.go_to(self.page_index.saturating_add(1), len)
    }

    pub fn previous(&mut self, len: usize) -> usize {
        self.go_to(self.page_index.saturating_sub(1), len)
    }

    /// Moves to `page_index`, clamped to `[1, max(total_pages, 1)]`.
    pub fn go_to(&mut self, page_index: usize, len: usize) -> usize {
        let last = self.total_pages(len).max(1);
        self.page_index = page_index.clamp(1, last);
        self.page_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_items_paginate_to_empty_for_any_page() {
        let items: Vec<u32> = Vec::new();
        for page in 0..5 {
            assert!(paginate(&items, page, PAGE_SIZE).is_empty());
        }
        assert_eq!(total_pages(items.len(), PAGE_SIZE), 0);
    }

    #[test]
    fn page_never_exceeds_page_size() {
        let items: Vec<u32> = (0..47).collect();
        for size in 1..12 {
            for page in 1..=total_pages(items.len(), size) + 2 {
                assert!(paginate(&items, page, size).len() <= size);
            }
        }
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(20, 9), 3);
        assert_eq!(total_pages(18, 9), 2);
        assert_eq!(total_pages(1, 9), 1);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn concatenated_pages_reconstruct_items() {
        let items: Vec<u32> = (0..20).collect();
        let rebuilt: Vec<u32> = (1..=total_pages(items.len(), PAGE_SIZE))
            .flat_map(|page| paginate(&items, page, PAGE_SIZE).iter().copied())
            .collect();
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn last_page_is_clipped() {
        let items: Vec<u32> = (0..20).collect();
        assert_eq!(paginate(&items, 3, PAGE_SIZE), &[18, 19]);
        assert!(paginate(&items, 4, PAGE_SIZE).is_empty());
    }

    #[test]
    fn zero_page_index_or_size_is_empty() {
        let items = [1, 2, 3];
        assert!(paginate(&items, 0, 3).is_empty());
        assert!(paginate(&items, 1, 0).is_empty());
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let mut cursor = PageCursor::default();
        assert_eq!(cursor.previous(20), 1);
        assert_eq!(cursor.next(20), 2);
        assert_eq!(cursor.next(20), 3);
        assert_eq!(cursor.next(20), 3);
        assert_eq!(cursor.go_to(0, 20), 1);
        assert_eq!(cursor.go_to(99, 20), 3);
    }

    #[test]
    fn cursor_stays_on_first_page_without_items() {
        let mut cursor = PageCursor::default();
        assert_eq!(cursor.next(0), 1);
        assert!(cursor.page::<u32>(&[]).is_empty());
        assert_eq!(cursor.total_pages(0), 0);
    }

    #[test]
    fn reset_returns_to_first_page() {
        let mut cursor = PageCursor::new(2);
        cursor.go_to(3, 10);
        cursor.reset();
        assert_eq!(cursor.page_index(), 1);
        assert_eq!(cursor.page(&[1, 2, 3]), &[1, 2]);
    }
}
