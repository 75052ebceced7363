//! Book catalog service

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, BookSummary, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with filters
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<BookSummary>, i64)> {
        self.repository.books.search(query).await
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Look a book up by its barcode, with its shelf location
    pub async fn get_book_by_barcode(&self, barcode: &str) -> AppResult<BookSummary> {
        self.repository.books.get_summary_by_barcode(barcode.trim()).await
    }

    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        let book = self.repository.books.create(&data).await?;
        tracing::info!(id = book.id, barcode = %book.barcode, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i64, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;
        self.repository.books.update(id, &data).await
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(id, "Book deleted");
        Ok(())
    }
}
