use serde::{Deserialize, Serialize};

/// Paginated envelope around any list-shaped response.
///
/// `count` is the number of items in this page, never a server-side total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseResult<T> {
    pub count: i64,
    pub start: i64,
    pub max: i64,
    pub items: Vec<T>,
}

impl<T> BrowseResult<T> {
    /// Wrap a page of items. `start` is either the page index or the row
    /// offset depending on the endpoint.
    pub fn new(items: Vec<T>, start: i64, max: i64) -> Self {
        Self {
            count: items.len() as i64,
            start,
            max,
            items,
        }
    }

    /// Envelope for lookups by explicit identifier, where the page is exactly
    /// what was found.
    pub fn exact(items: Vec<T>) -> Self {
        let n = items.len() as i64;
        Self::new(items, 0, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tracks_returned_items() {
        let page = BrowseResult::new(vec!["a", "b", "c"], 1, 10);
        assert_eq!(page.count, 3);
        assert_eq!(page.start, 1);
        assert_eq!(page.max, 10);
        assert!(page.items.len() as i64 <= page.max);
    }

    #[test]
    fn test_exact_envelope() {
        let page = BrowseResult::exact(vec![1, 2]);
        assert_eq!((page.count, page.start, page.max), (2, 0, 2));

        let empty: BrowseResult<i32> = BrowseResult::exact(Vec::new());
        assert_eq!((empty.count, empty.start, empty.max), (0, 0, 0));
    }
}
