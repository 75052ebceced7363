//! Borrow and return transactions against the catalog

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{
            BorrowDetail, BorrowLine, BorrowReceipt, BorrowRecord, BorrowRecordDetails,
            BorrowRecordQuery, BorrowStatus, BorrowedBook, ReturnLine, ScanResult,
        },
        borrower::{Borrower, BorrowerLoans},
        cart::CartUser,
        page_bounds, page_offset,
    },
};

/// Catalog operations the borrow/return workflow depends on.
///
/// A borrow commit is all-or-nothing; a return is one transaction per barcode.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CirculationStore: Send + Sync {
    /// Resolve a scanned barcode (None when it is not cataloged)
    async fn find_book_by_barcode(&self, barcode: String) -> AppResult<Option<Book>>;

    /// Create the borrower or update their name
    async fn upsert_borrower(&self, borrower: CartUser) -> AppResult<Borrower>;

    /// Record one borrow of `barcodes` (in scan order) in a single transaction
    async fn commit_borrow(
        &self,
        borrower: CartUser,
        barcodes: Vec<String>,
    ) -> AppResult<BorrowReceipt>;

    /// Return one copy borrowed under `phone` in its own transaction.
    /// Copies held by a concurrent return are passed over, not waited on.
    async fn return_item(&self, phone: String, barcode: String) -> AppResult<ReturnLine>;

    /// Take one unit out of stock without recording a borrow
    async fn scan_out(&self, barcode: String) -> AppResult<ScanResult>;

    async fn list_records(
        &self,
        query: BorrowRecordQuery,
    ) -> AppResult<(Vec<BorrowRecordDetails>, i64)>;

    async fn borrower_loans(&self, phone: String) -> AppResult<BorrowerLoans>;
}

#[derive(Clone)]
pub struct CirculationRepository {
    pool: Pool<Postgres>,
}

impl CirculationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Outstanding copies of the given records, grouped by record, in scan order
    async fn books_for_records(
        &self,
        record_ids: &[i64],
    ) -> AppResult<HashMap<i64, Vec<BorrowedBook>>> {
        if record_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, BorrowedBook>(
            r#"
            SELECT d.borrow_record_id, d.barcode, d.book_id, b.name
            FROM borrow_details d
            LEFT JOIN books b ON b.id = d.book_id
            WHERE d.borrow_record_id = ANY($1)
            ORDER BY d.id
            "#,
        )
        .bind(record_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<BorrowedBook>> = HashMap::new();
        for row in rows {
            grouped.entry(row.borrow_record_id).or_default().push(row);
        }
        Ok(grouped)
    }
}

async fn upsert_borrower_with(conn: &mut PgConnection, borrower: &CartUser) -> AppResult<Borrower> {
    let row = sqlx::query_as::<_, Borrower>(
        r#"
        INSERT INTO borrowers (name, phone)
        VALUES ($1, $2)
        ON CONFLICT (phone) DO UPDATE SET name = EXCLUDED.name, updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(&borrower.name)
    .bind(&borrower.phone)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

#[async_trait]
impl CirculationStore for CirculationRepository {
    async fn find_book_by_barcode(&self, barcode: String) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE barcode = $1")
            .bind(&barcode)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn upsert_borrower(&self, borrower: CartUser) -> AppResult<Borrower> {
        let mut conn = self.pool.acquire().await?;
        upsert_borrower_with(&mut conn, &borrower).await
    }

    async fn commit_borrow(
        &self,
        borrower: CartUser,
        barcodes: Vec<String>,
    ) -> AppResult<BorrowReceipt> {
        if barcodes.is_empty() {
            return Err(AppError::Validation("At least one barcode is required".to_string()));
        }

        let now = Utc::now();
        // Dropping the transaction on any early return rolls it back
        let mut tx = self.pool.begin().await?;

        upsert_borrower_with(&mut tx, &borrower).await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (borrower_name, borrower_phone, borrow_time, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&borrower.name)
        .bind(&borrower.phone)
        .bind(now)
        .bind(BorrowStatus::Active)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(barcodes.len());
        for barcode in &barcodes {
            let book =
                sqlx::query_as::<_, Book>("SELECT * FROM books WHERE barcode = $1 FOR UPDATE")
                    .bind(barcode)
                    .fetch_optional(&mut *tx)
                    .await?;

            let line = BorrowLine::plan(barcode, book.as_ref());
            if let Some(book_id) = line.book_id {
                sqlx::query(
                    "UPDATE books SET in_stock = in_stock - 1, updated_at = $2 WHERE id = $1 AND in_stock > 0",
                )
                .bind(book_id)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
            lines.push(line);
        }

        {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO borrow_details (borrow_record_id, book_id, barcode, created_at) ",
            );
            builder.push_values(lines.iter(), |mut row, line| {
                row.push_bind(record.id)
                    .push_bind(line.book_id)
                    .push_bind(line.barcode.clone())
                    .push_bind(now);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(
            record_id = record.id,
            phone = %record.borrower_phone,
            copies = lines.len(),
            linked = lines.iter().filter(|l| l.takes_stock()).count(),
            "Borrow committed"
        );

        Ok(BorrowReceipt { record, books: lines })
    }

    async fn return_item(&self, phone: String, barcode: String) -> AppResult<ReturnLine> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let detail = sqlx::query_as::<_, BorrowDetail>(
            r#"
            SELECT d.*
            FROM borrow_details d
            JOIN borrow_records r ON r.id = d.borrow_record_id
            WHERE d.barcode = $1 AND r.status = $2 AND r.borrower_phone = $3
            ORDER BY d.id
            LIMIT 1
            FOR UPDATE OF d SKIP LOCKED
            "#,
        )
        .bind(&barcode)
        .bind(BorrowStatus::Active)
        .bind(&phone)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(detail) = detail else {
            tx.rollback().await?;
            tracing::warn!(%barcode, %phone, "Return skipped: no active borrow");
            return Ok(ReturnLine::skipped(&barcode));
        };

        // Serializes concurrent returns against the same record
        sqlx::query("SELECT id FROM borrow_records WHERE id = $1 FOR UPDATE")
            .bind(detail.borrow_record_id)
            .execute(&mut *tx)
            .await?;

        if let Some(book_id) = detail.book_id {
            sqlx::query(
                "UPDATE books SET in_stock = LEAST(in_stock + 1, quantity), updated_at = $2 WHERE id = $1",
            )
            .bind(book_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM borrow_details WHERE id = $1")
            .bind(detail.id)
            .execute(&mut *tx)
            .await?;

        let remaining: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_details WHERE borrow_record_id = $1")
                .bind(detail.borrow_record_id)
                .fetch_one(&mut *tx)
                .await?;

        let closed = remaining == 0;
        if closed {
            sqlx::query(
                "UPDATE borrow_records SET status = $1, returned_at = $2, updated_at = $2 WHERE id = $3",
            )
            .bind(BorrowStatus::Returned)
            .bind(now)
            .bind(detail.borrow_record_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            record_id = detail.borrow_record_id,
            %barcode,
            record_closed = closed,
            "Copy returned"
        );

        Ok(ReturnLine::returned(&barcode, detail.borrow_record_id, closed))
    }

    async fn scan_out(&self, barcode: String) -> AppResult<ScanResult> {
        let taken = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET in_stock = in_stock - 1, updated_at = $2
            WHERE barcode = $1 AND in_stock > 0
            RETURNING *
            "#,
        )
        .bind(&barcode)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let book = match taken {
            Some(book) => Some(book),
            None => self.find_book_by_barcode(barcode.clone()).await?,
        };

        Ok(ScanResult {
            barcode,
            id: book.as_ref().map(|b| b.id),
            name: book.as_ref().map(|b| b.name.clone()),
            in_stock: book.as_ref().map(|b| b.in_stock),
        })
    }

    async fn list_records(
        &self,
        query: BorrowRecordQuery,
    ) -> AppResult<(Vec<BorrowRecordDetails>, i64)> {
        let (page, per_page) = page_bounds(query.page, query.per_page);
        let offset = page_offset(page, per_page);
        let status = query.status.unwrap_or(BorrowStatus::Active);

        let mut conditions = vec!["r.status = $1".to_string()];
        let mut idx = 2;

        if query.borrower_name.is_some() {
            conditions.push(format!("r.borrower_name = ${}", idx));
            idx += 1;
        }
        if query.borrower_phone.is_some() {
            conditions.push(format!("r.borrower_phone = ${}", idx));
            idx += 1;
        }
        if query.barcode.is_some() {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM borrow_details d WHERE d.borrow_record_id = r.id AND d.barcode = ${})",
                idx
            ));
            idx += 1;
        }
        if query.start_time.is_some() {
            conditions.push(format!("r.borrow_time >= ${}", idx));
            idx += 1;
        }
        if query.end_time.is_some() {
            conditions.push(format!("r.borrow_time <= ${}", idx));
        }

        let where_clause = conditions.join(" AND ");

        macro_rules! bind_filters {
            ($builder:expr) => {{
                let mut builder = $builder.bind(status);
                if let Some(ref v) = query.borrower_name { builder = builder.bind(v); }
                if let Some(ref v) = query.borrower_phone { builder = builder.bind(v); }
                if let Some(ref v) = query.barcode { builder = builder.bind(v); }
                if let Some(v) = query.start_time { builder = builder.bind(v); }
                if let Some(v) = query.end_time { builder = builder.bind(v); }
                builder
            }};
        }

        let count_sql = format!("SELECT COUNT(*) FROM borrow_records r WHERE {}", where_clause);
        let total: i64 = bind_filters!(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let select_sql = format!(
            "SELECT r.* FROM borrow_records r WHERE {} ORDER BY r.borrow_time DESC, r.id DESC LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let records = bind_filters!(sqlx::query_as::<_, BorrowRecord>(&select_sql))
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let mut books = self.books_for_records(&ids).await?;

        let details = records
            .into_iter()
            .map(|record| BorrowRecordDetails {
                books: books.remove(&record.id).unwrap_or_default(),
                record,
            })
            .collect();

        Ok((details, total))
    }

    async fn borrower_loans(&self, phone: String) -> AppResult<BorrowerLoans> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE borrower_phone = $1 AND status = $2 ORDER BY borrow_time, id",
        )
        .bind(&phone)
        .bind(BorrowStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        let Some(first) = records.first() else {
            return Err(AppError::NotFound(format!(
                "No active borrow records for phone {}",
                phone
            )));
        };

        let current_name: Option<String> =
            sqlx::query_scalar("SELECT name FROM borrowers WHERE phone = $1")
                .bind(&phone)
                .fetch_optional(&self.pool)
                .await?;

        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let mut grouped = self.books_for_records(&ids).await?;
        let books = ids
            .iter()
            .flat_map(|id| grouped.remove(id).unwrap_or_default())
            .collect();

        Ok(BorrowerLoans {
            borrower_name: current_name.unwrap_or_else(|| first.borrower_name.clone()),
            borrower_phone: phone,
            borrow_time: first.borrow_time,
            books,
        })
    }
}
