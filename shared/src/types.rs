//! Common types used across the platform

/// Fixed page size for all paginated listing endpoints
pub const PAGE_SIZE: i64 = 10;

/// Number of pages needed to show `total` items at [`PAGE_SIZE`] per page
pub fn total_pages(total: i64) -> i64 {
    (total + PAGE_SIZE - 1) / PAGE_SIZE
}

/// Normalize a requested page number to be at least 1
pub fn normalize_page(page: Option<i64>) -> i64 {
    page.filter(|p| *p >= 1).unwrap_or(1)
}

/// Offset into the result set for a 1-based page number
pub fn page_offset(page: i64) -> i64 {
    (page - 1) * PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
        assert_eq!(total_pages(95), 10);
    }

    #[test]
    fn test_normalize_page() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some(0)), 1);
        assert_eq!(normalize_page(Some(-3)), 1);
        assert_eq!(normalize_page(Some(7)), 7);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(2), 10);
        assert_eq!(page_offset(5), 40);
    }
}
