use serde::{Deserialize, Serialize};

/// A bounded slice of a filtered, sorted result set, 1-indexed.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> PagedResult<T> {
    /// Wraps one page of items together with the pagination metadata derived
    /// from the total row count.
    pub fn new(items: Vec<T>, total_count: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + page_size - 1) / page_size
        };
        Self {
            items,
            total_count,
            page,
            page_size,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_middle_page_of_25() {
        let items: Vec<u32> = (10..20).collect();
        let paged = PagedResult::new(items, 25, 2, 10);
        assert_eq!(paged.items.len(), 10);
        assert_eq!(paged.total_count, 25);
        assert_eq!(paged.total_pages, 3);
        assert!(paged.has_next_page);
        assert!(paged.has_previous_page);
    }

    #[test]
    fn test_first_and_last_page_flags() {
        let first = PagedResult::new(vec![1, 2], 4, 1, 2);
        assert!(first.has_next_page);
        assert!(!first.has_previous_page);

        let last = PagedResult::new(vec![3, 4], 4, 2, 2);
        assert!(!last.has_next_page);
        assert!(last.has_previous_page);
    }

    #[test]
    fn test_empty_result() {
        let paged: PagedResult<u32> = PagedResult::new(Vec::new(), 0, 1, 10);
        assert_eq!(paged.total_pages, 0);
        assert!(!paged.has_next_page);
        assert!(!paged.has_previous_page);
    }

    #[test]
    fn test_exact_multiple_page_count() {
        let paged: PagedResult<u32> = PagedResult::new(Vec::new(), 30, 3, 10);
        assert_eq!(paged.total_pages, 3);
        assert!(!paged.has_next_page);
    }

    #[test]
    fn test_serialized_field_names() {
        let paged = PagedResult::new(vec![1], 1, 1, 10);
        let json = serde_json::to_value(&paged).unwrap();
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["hasNextPage"], false);
        assert_eq!(json["hasPreviousPage"], false);
    }
}
