//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    /// Barcode printed on the copies (unique)
    pub barcode: String,
    pub name: String,
    /// Total number of copies owned
    pub quantity: i32,
    /// Copies currently on the shelf
    pub in_stock: i32,
    pub shelf_layer_id: Option<i64>,
    pub price: Option<Decimal>,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Whether at least one copy can be lent out
    pub fn is_available(&self) -> bool {
        self.in_stock > 0
    }
}

/// Book row for listings, with its shelf location resolved
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub book: Book,
    /// "Area-Bookshelf-Layer" when the book is shelved
    pub location_name: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 100))]
    pub barcode: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    /// Defaults to `quantity`
    #[validate(range(min = 0))]
    pub in_stock: Option<i32>,
    pub shelf_layer_id: Option<i64>,
    pub price: Option<Decimal>,
    pub remark: Option<String>,
}

impl CreateBook {
    /// Stock the book starts with
    pub fn initial_stock(&self) -> AppResult<i32> {
        let in_stock = self.in_stock.unwrap_or(self.quantity);
        check_stock_bounds(in_stock, self.quantity)?;
        Ok(in_stock)
    }
}

/// Update book request (partial)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub in_stock: Option<i32>,
    pub shelf_layer_id: Option<i64>,
    pub price: Option<Decimal>,
    pub remark: Option<String>,
}

impl UpdateBook {
    /// Check the counts the book would end up with
    pub fn check_against(&self, current: &Book) -> AppResult<()> {
        let quantity = self.quantity.unwrap_or(current.quantity);
        let in_stock = self.in_stock.unwrap_or(current.in_stock);
        check_stock_bounds(in_stock, quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.in_stock.is_none()
            && self.shelf_layer_id.is_none()
            && self.price.is_none()
            && self.remark.is_none()
    }
}

fn check_stock_bounds(in_stock: i32, quantity: i32) -> AppResult<()> {
    if in_stock < 0 || quantity < 0 {
        return Err(AppError::Validation(
            "quantity and in_stock must not be negative".to_string(),
        ));
    }
    if in_stock > quantity {
        return Err(AppError::Conflict(format!(
            "in_stock ({}) cannot exceed quantity ({})",
            in_stock, quantity
        )));
    }
    Ok(())
}

/// Stock filter for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    /// At least one copy on the shelf
    Available,
    /// At least one copy lent out
    Borrowed,
}

/// Book search query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub area_id: Option<i64>,
    pub bookshelf_id: Option<i64>,
    pub shelf_layer_id: Option<i64>,
    pub stock: Option<StockFilter>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
