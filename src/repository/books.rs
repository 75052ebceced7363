//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, BookSummary, CreateBook, StockFilter, UpdateBook},
        page_bounds, page_offset,
    },
};

/// Book columns plus the "Area-Bookshelf-Layer" display name
const SUMMARY_FROM: &str = r#"
    FROM books b
    LEFT JOIN shelf_layers l ON l.id = b.shelf_layer_id
    LEFT JOIN bookshelves s ON s.id = l.bookshelf_id
    LEFT JOIN areas a ON a.id = s.area_id
"#;

const SUMMARY_COLUMNS: &str = r#"
    b.*,
    CASE WHEN l.id IS NULL THEN NULL
         ELSE a.name || '-' || s.name || '-' || l.name
    END AS location_name
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get a book by barcode with its location
    pub async fn get_summary_by_barcode(&self, barcode: &str) -> AppResult<BookSummary> {
        let sql = format!("SELECT {} {} WHERE b.barcode = $1", SUMMARY_COLUMNS, SUMMARY_FROM);
        sqlx::query_as::<_, BookSummary>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with barcode {} not found", barcode)))
    }

    /// Search books with filters and pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookSummary>, i64)> {
        let (page, per_page) = page_bounds(query.page, query.per_page);
        let offset = page_offset(page, per_page);

        let mut conditions = vec!["1=1".to_string()];
        let mut params = 0;

        macro_rules! add_condition {
            ($field:expr, $sql:expr) => {
                if $field.is_some() {
                    params += 1;
                    conditions.push(format!($sql, params));
                }
            };
        }

        add_condition!(query.name, "b.name ILIKE ${}");
        add_condition!(query.barcode, "b.barcode = ${}");
        add_condition!(query.area_id, "a.id = ${}");
        add_condition!(query.bookshelf_id, "s.id = ${}");
        add_condition!(query.shelf_layer_id, "b.shelf_layer_id = ${}");

        match query.stock {
            Some(StockFilter::Available) => conditions.push("b.in_stock > 0".to_string()),
            Some(StockFilter::Borrowed) => conditions.push("b.in_stock < b.quantity".to_string()),
            None => {}
        }

        let where_clause = conditions.join(" AND ");
        let name_pattern = query.name.as_ref().map(|n| format!("%{}%", n));

        macro_rules! bind_filters {
            ($builder:expr) => {{
                let mut builder = $builder;
                if let Some(ref v) = name_pattern { builder = builder.bind(v); }
                if let Some(ref v) = query.barcode { builder = builder.bind(v); }
                if let Some(v) = query.area_id { builder = builder.bind(v); }
                if let Some(v) = query.bookshelf_id { builder = builder.bind(v); }
                if let Some(v) = query.shelf_layer_id { builder = builder.bind(v); }
                builder
            }};
        }

        let count_sql = format!("SELECT COUNT(*) {} WHERE {}", SUMMARY_FROM, where_clause);
        let total: i64 = bind_filters!(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let select_sql = format!(
            "SELECT {} {} WHERE {} ORDER BY b.id LIMIT {} OFFSET {}",
            SUMMARY_COLUMNS, SUMMARY_FROM, where_clause, per_page, offset
        );
        let rows = bind_filters!(sqlx::query_as::<_, BookSummary>(&select_sql))
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn barcode_exists(&self, barcode: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE barcode = $1)")
                .bind(barcode)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn ensure_shelf_layer(&self, shelf_layer_id: Option<i64>) -> AppResult<()> {
        let Some(id) = shelf_layer_id else { return Ok(()) };
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shelf_layers WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Shelf layer {} not found", id)));
        }
        Ok(())
    }

    /// Create a new book
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let in_stock = data.initial_stock()?;

        if self.barcode_exists(&data.barcode).await? {
            return Err(AppError::Conflict(format!(
                "Book with barcode {} already exists",
                data.barcode
            )));
        }
        self.ensure_shelf_layer(data.shelf_layer_id).await?;

        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (barcode, name, quantity, in_stock, shelf_layer_id, price, remark)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&data.barcode)
        .bind(&data.name)
        .bind(data.quantity)
        .bind(in_stock)
        .bind(data.shelf_layer_id)
        .bind(data.price)
        .bind(&data.remark)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a book (only provided fields)
    pub async fn update(&self, id: i64, data: &UpdateBook) -> AppResult<Book> {
        let current = self.get_by_id(id).await?;
        if data.is_empty() {
            return Ok(current);
        }
        data.check_against(&current)?;
        self.ensure_shelf_layer(data.shelf_layer_id).await?;

        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.quantity, "quantity");
        add_field!(data.in_stock, "in_stock");
        add_field!(data.shelf_layer_id, "shelf_layer_id");
        add_field!(data.price, "price");
        add_field!(data.remark, "remark");

        let query = format!("UPDATE books SET {} WHERE id = ${} RETURNING *", sets.join(", "), idx);

        let mut builder = sqlx::query_as::<_, Book>(&query).bind(Utc::now());

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.quantity);
        bind_field!(data.in_stock);
        bind_field!(data.shelf_layer_id);
        bind_field!(data.price);
        bind_field!(data.remark);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book that no borrow detail references
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let borrowed: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_details WHERE book_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if borrowed > 0 {
            return Err(AppError::Conflict(format!(
                "Book {} has {} copy(ies) on loan and cannot be deleted",
                id, borrowed
            )));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
