//! Data models for Shelfwise

pub mod book;
pub mod borrow;
pub mod borrower;
pub mod cart;
pub mod location;

// Re-export commonly used types
pub use book::{Book, BookSummary};
pub use borrow::{BorrowDetail, BorrowLine, BorrowReceipt, BorrowRecord, BorrowStatus, ReturnLine};
pub use borrower::Borrower;
pub use cart::{Cart, CartItem, CartSlot, CartUser};
pub use location::{Area, AreaNode, Bookshelf, ShelfLayer};

const MAX_PER_PAGE: i64 = 200;
const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

/// Effective (page, per_page) of a listing: page in 1..=MAX_PAGE, per_page in 1..=200
pub fn page_bounds(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    (
        page.unwrap_or(1).clamp(1, MAX_PAGE),
        per_page.unwrap_or(20).clamp(1, MAX_PER_PAGE),
    )
}

/// Rows to skip before `page`
pub fn page_offset(page: i64, per_page: i64) -> i64 {
    (page - 1).saturating_mul(per_page)
}

#[cfg(test)]
mod tests {
    use super::{page_bounds, page_offset, MAX_PAGE};

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(None, None), (1, 20));
        assert_eq!(page_bounds(Some(0), Some(1000)), (1, 200));
        assert_eq!(page_bounds(Some(3), Some(0)), (3, 1));
    }

    #[test]
    fn test_huge_page_number() {
        let (page, per_page) = page_bounds(Some(i64::MAX), Some(200));
        assert_eq!(page, MAX_PAGE);
        assert!(page_offset(page, per_page) > 0);

        let (page, per_page) = page_bounds(Some(i64::MAX), None);
        assert_eq!(page_offset(page, per_page), (MAX_PAGE - 1) * 20);
        assert_eq!(page_offset(1, 20), 0);
    }
}
