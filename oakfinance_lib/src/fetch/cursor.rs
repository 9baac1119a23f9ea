//! Offset cursor for walking a paginated collection.

use netfile_api::types::Page;

/// Position of the next request in a paginated pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub offset: u64,
    pub limit: u64,
    /// Total record count as last reported by the API, if it reported one.
    pub total: Option<u64>,
}

impl Cursor {
    pub fn start(limit: u64) -> Self {
        Self {
            offset: 0,
            limit,
            total: None,
        }
    }
}

/// The parts of a page envelope that drive the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub has_next_page: bool,
    pub result_count: usize,
    pub total_count: Option<u64>,
}

impl<T> From<&Page<T>> for PageMeta {
    fn from(page: &Page<T>) -> Self {
        Self {
            has_next_page: page.has_next_page,
            result_count: page.results.len(),
            total_count: page.total_count,
        }
    }
}

/// Advances the cursor past the page just received.
///
/// Returns `None` once the API says there is no next page, or when a page
/// comes back empty (a server that keeps claiming more pages would otherwise
/// loop forever).
pub fn next_cursor(cursor: Cursor, meta: &PageMeta) -> Option<Cursor> {
    if !meta.has_next_page || meta.result_count == 0 {
        return None;
    }
    Some(Cursor {
        offset: cursor.offset + cursor.limit,
        limit: cursor.limit,
        total: meta.total_count.or(cursor.total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(has_next_page: bool, result_count: usize, total: Option<u64>) -> PageMeta {
        PageMeta {
            has_next_page,
            result_count,
            total_count: total,
        }
    }

    #[test]
    fn walks_2500_in_three_steps() {
        let first = Cursor::start(1000);
        let second = next_cursor(first, &meta(true, 1000, Some(2500))).unwrap();
        assert_eq!(second.offset, 1000);
        assert_eq!(second.total, Some(2500));
        let third = next_cursor(second, &meta(true, 1000, Some(2500))).unwrap();
        assert_eq!(third.offset, 2000);
        assert_eq!(next_cursor(third, &meta(false, 500, Some(2500))), None);
    }

    #[test]
    fn empty_page_ends_even_if_next_claimed() {
        assert_eq!(next_cursor(Cursor::start(1000), &meta(true, 0, None)), None);
    }

    #[test]
    fn keeps_previous_total_when_page_omits_it() {
        let cursor = Cursor {
            offset: 0,
            limit: 10,
            total: Some(30),
        };
        let next = next_cursor(cursor, &meta(true, 10, None)).unwrap();
        assert_eq!(next.total, Some(30));
    }
}
