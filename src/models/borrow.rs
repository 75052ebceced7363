//! Borrow records, their details and the results of borrow/return commits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::Book;

/// Borrow record status (stored as SMALLINT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum BorrowStatus {
    /// At least one copy still out
    Active = 1,
    /// Every copy came back
    Returned = 2,
}

impl From<BorrowStatus> for i16 {
    fn from(s: BorrowStatus) -> Self {
        s as i16
    }
}

/// One borrowing transaction
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i64,
    pub borrower_name: String,
    pub borrower_phone: String,
    pub borrow_time: DateTime<Utc>,
    pub status: BorrowStatus,
    pub returned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One borrowed copy; deleted when that copy is returned
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowDetail {
    pub id: i64,
    pub borrow_record_id: i64,
    /// Set only when the copy was taken out of a cataloged book's stock
    pub book_id: Option<i64>,
    pub barcode: String,
    pub created_at: DateTime<Utc>,
}

/// A copy still out, joined with its book name when known
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowedBook {
    #[serde(skip)]
    pub borrow_record_id: i64,
    pub barcode: String,
    pub book_id: Option<i64>,
    pub name: Option<String>,
}

/// Borrow record with its outstanding copies in scan order
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowRecordDetails {
    #[serde(flatten)]
    pub record: BorrowRecord,
    pub books: Vec<BorrowedBook>,
}

/// Borrow record search query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BorrowRecordQuery {
    pub borrower_name: Option<String>,
    pub borrower_phone: Option<String>,
    /// Records holding a copy with this barcode
    pub barcode: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Defaults to active records
    pub status: Option<BorrowStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// How a scanned barcode is recorded in a borrow commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BorrowLine {
    pub barcode: String,
    /// Linked book; its stock was decremented by one
    pub book_id: Option<i64>,
    pub name: Option<String>,
}

impl BorrowLine {
    /// Link the copy to `book` only when a unit can be taken from its stock.
    /// Unknown and out-of-stock barcodes are still recorded, unlinked.
    pub fn plan(barcode: &str, book: Option<&Book>) -> Self {
        match book {
            Some(book) if book.is_available() => Self {
                barcode: barcode.to_string(),
                book_id: Some(book.id),
                name: Some(book.name.clone()),
            },
            Some(book) => Self {
                barcode: barcode.to_string(),
                book_id: None,
                name: Some(book.name.clone()),
            },
            None => Self {
                barcode: barcode.to_string(),
                book_id: None,
                name: None,
            },
        }
    }

    pub fn takes_stock(&self) -> bool {
        self.book_id.is_some()
    }
}

/// Result of a committed borrow
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowReceipt {
    pub record: BorrowRecord,
    pub books: Vec<BorrowLine>,
}

/// Direct (unstaged) borrow request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DirectBorrow {
    #[validate(length(min = 1, max = 50))]
    pub borrower_name: String,
    #[validate(length(min = 1, max = 20))]
    pub borrower_phone: String,
    #[validate(length(min = 1, message = "at least one barcode is required"))]
    pub barcodes: Vec<String>,
}

/// Direct (unstaged) return request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DirectReturn {
    #[validate(length(min = 1, max = 20))]
    pub borrower_phone: String,
    #[validate(length(min = 1, message = "at least one barcode is required"))]
    pub barcodes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Returned,
    /// No active borrow of this barcode for the phone
    Skipped,
    /// The item's transaction failed; other items were still processed
    Failed,
}

/// Outcome of returning one barcode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReturnLine {
    pub barcode: String,
    pub status: ReturnStatus,
    pub record_id: Option<i64>,
    /// The owning record has no copies left out and is now returned
    pub record_closed: bool,
    pub message: Option<String>,
}

impl ReturnLine {
    pub fn returned(barcode: &str, record_id: i64, record_closed: bool) -> Self {
        Self {
            barcode: barcode.to_string(),
            status: ReturnStatus::Returned,
            record_id: Some(record_id),
            record_closed,
            message: None,
        }
    }

    pub fn skipped(barcode: &str) -> Self {
        Self {
            barcode: barcode.to_string(),
            status: ReturnStatus::Skipped,
            record_id: None,
            record_closed: false,
            message: Some("No active borrow for this barcode and phone".to_string()),
        }
    }

    pub fn failed(barcode: &str, message: String) -> Self {
        Self {
            barcode: barcode.to_string(),
            status: ReturnStatus::Failed,
            record_id: None,
            record_closed: false,
            message: Some(message),
        }
    }
}

/// Live feedback for a single scanned barcode
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScanResult {
    pub barcode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScanRequest {
    #[validate(length(min = 1, max = 100))]
    pub barcode: String,
}
