//! Page arithmetic shared by every "load more" list on the dashboard.

use serde::Serialize;

/// Zero-based page index. Negative or missing input clamps to the first page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageIndex(u32);

impl PageIndex {
    pub fn new(raw: Option<i64>) -> Self {
        let raw = raw.unwrap_or(0).clamp(0, i64::from(u32::MAX));
        Self(raw as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn offset(self, page_size: usize) -> usize {
        (self.0 as usize).saturating_mul(page_size)
    }
}

/// Cheap "is there another page" guess: a full page implies more may follow.
///
/// When the remaining rows exactly fill the last page this reports `true` and
/// the caller's next request comes back empty. Callers rely on that, so an
/// exact-count variant must be swapped in here rather than at call sites.
pub fn has_more(returned: usize, page_size: usize) -> bool {
    returned >= page_size
}

/// Cuts `page` out of an already ordered sequence; shorter (or empty) at the tail.
pub fn slice_page<T>(items: Vec<T>, page: PageIndex, page_size: usize) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset(page_size))
        .take(page_size)
        .collect()
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: PageIndex, page_size: usize) -> Self {
        Self {
            has_more: has_more(items.len(), page_size),
            items,
            page: page.get(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
            page: self.page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 0)]
    #[case(Some(-4), 0)]
    #[case(Some(0), 0)]
    #[case(Some(3), 3)]
    fn clamps_page_index(#[case] raw: Option<i64>, #[case] expected: u32) {
        assert_eq!(PageIndex::new(raw).get(), expected);
    }

    #[test]
    fn slices_tail_shorter_than_page() {
        let items: Vec<u32> = (0..14).collect();
        assert_eq!(slice_page(items.clone(), PageIndex::new(Some(2)), 6), vec![12, 13]);
        assert!(slice_page(items, PageIndex::new(Some(5)), 6).is_empty());
    }

    #[rstest]
    #[case(6, 6, true)]
    #[case(5, 6, false)]
    #[case(0, 6, false)]
    fn full_page_reports_more(#[case] returned: usize, #[case] size: usize, #[case] expected: bool) {
        assert_eq!(has_more(returned, size), expected);
    }

    #[test]
    fn exact_boundary_yields_one_empty_follow_up() {
        let items: Vec<u32> = (0..12).collect();
        let second = Page::new(slice_page(items.clone(), PageIndex::new(Some(1)), 6), PageIndex::new(Some(1)), 6);
        assert!(second.has_more);

        let third = Page::new(slice_page(items, PageIndex::new(Some(2)), 6), PageIndex::new(Some(2)), 6);
        assert!(third.items.is_empty());
        assert!(!third.has_more);
    }
}
