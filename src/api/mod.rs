//! API handlers for Shelfwise REST endpoints

pub mod books;
pub mod carts;
pub mod circulation;
pub mod health;
pub mod locations;
pub mod openapi;

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{book::BookSummary, borrow::BorrowRecordDetails, page_bounds};

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
#[aliases(
    PaginatedBooks = PaginatedResponse<BookSummary>,
    PaginatedBorrowRecords = PaginatedResponse<BorrowRecordDetails>
)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Items of the requested page
    pub items: Vec<T>,
    /// Total number of matching items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, page: Option<i64>, per_page: Option<i64>) -> Self {
        let (page, per_page) = page_bounds(page, per_page);
        Self {
            items,
            total,
            page,
            per_page,
        }
    }
}
