//! Borrower model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::borrow::BorrowedBook;

/// Borrower, identified by phone; the latest name given wins
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrower {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything a phone number currently has out, across active records
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowerLoans {
    pub borrower_name: String,
    pub borrower_phone: String,
    /// Time of the earliest active record
    pub borrow_time: DateTime<Utc>,
    pub books: Vec<BorrowedBook>,
}
