//! Areas, bookshelves and shelf layers

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::location::{
        Area, AreaInput, Bookshelf, BookshelfInput, BookshelfQuery, ShelfLayer, ShelfLayerInput,
        ShelfLayerQuery,
    },
};

#[derive(Clone)]
pub struct LocationsRepository {
    pool: Pool<Postgres>,
}

impl LocationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // AREAS
    // =========================================================================

    /// List all areas in creation order
    pub async fn areas_list(&self) -> AppResult<Vec<Area>> {
        let rows = sqlx::query_as::<_, Area>("SELECT * FROM areas ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn area_get(&self, id: i64) -> AppResult<Area> {
        sqlx::query_as::<_, Area>("SELECT * FROM areas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Area {} not found", id)))
    }

    async fn area_name_taken(&self, name: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM areas WHERE name = $1 AND ($2::bigint IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn area_create(&self, data: &AreaInput) -> AppResult<Area> {
        if self.area_name_taken(&data.name, None).await? {
            return Err(AppError::Conflict(format!("Area '{}' already exists", data.name)));
        }

        let row = sqlx::query_as::<_, Area>("INSERT INTO areas (name) VALUES ($1) RETURNING *")
            .bind(&data.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn area_update(&self, id: i64, data: &AreaInput) -> AppResult<Area> {
        if self.area_name_taken(&data.name, Some(id)).await? {
            return Err(AppError::Conflict(format!("Area '{}' already exists", data.name)));
        }

        sqlx::query_as::<_, Area>(
            "UPDATE areas SET name = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(&data.name)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Area {} not found", id)))
    }

    /// Delete an area that holds no bookshelves
    pub async fn area_delete(&self, id: i64) -> AppResult<()> {
        let children: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookshelves WHERE area_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if children > 0 {
            return Err(AppError::Conflict(format!(
                "Area {} still has {} bookshelf(s)",
                id, children
            )));
        }

        let result = sqlx::query("DELETE FROM areas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Area {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // BOOKSHELVES
    // =========================================================================

    pub async fn bookshelves_list(&self, query: &BookshelfQuery) -> AppResult<Vec<Bookshelf>> {
        let rows = sqlx::query_as::<_, Bookshelf>(
            "SELECT * FROM bookshelves WHERE ($1::bigint IS NULL OR area_id = $1) ORDER BY id",
        )
        .bind(query.area_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn bookshelf_get(&self, id: i64) -> AppResult<Bookshelf> {
        sqlx::query_as::<_, Bookshelf>("SELECT * FROM bookshelves WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bookshelf {} not found", id)))
    }

    pub async fn bookshelf_create(&self, data: &BookshelfInput) -> AppResult<Bookshelf> {
        self.area_get(data.area_id).await?;

        let row = sqlx::query_as::<_, Bookshelf>(
            "INSERT INTO bookshelves (area_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(data.area_id)
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn bookshelf_update(&self, id: i64, data: &BookshelfInput) -> AppResult<Bookshelf> {
        self.area_get(data.area_id).await?;

        sqlx::query_as::<_, Bookshelf>(
            "UPDATE bookshelves SET area_id = $1, name = $2, updated_at = $3 WHERE id = $4 RETURNING *",
        )
        .bind(data.area_id)
        .bind(&data.name)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Bookshelf {} not found", id)))
    }

    /// Delete a bookshelf that holds no shelf layers
    pub async fn bookshelf_delete(&self, id: i64) -> AppResult<()> {
        let children: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shelf_layers WHERE bookshelf_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if children > 0 {
            return Err(AppError::Conflict(format!(
                "Bookshelf {} still has {} shelf layer(s)",
                id, children
            )));
        }

        let result = sqlx::query("DELETE FROM bookshelves WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Bookshelf {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // SHELF LAYERS
    // =========================================================================

    pub async fn shelf_layers_list(&self, query: &ShelfLayerQuery) -> AppResult<Vec<ShelfLayer>> {
        let rows = sqlx::query_as::<_, ShelfLayer>(
            "SELECT * FROM shelf_layers WHERE ($1::bigint IS NULL OR bookshelf_id = $1) ORDER BY id",
        )
        .bind(query.bookshelf_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn shelf_layer_get(&self, id: i64) -> AppResult<ShelfLayer> {
        sqlx::query_as::<_, ShelfLayer>("SELECT * FROM shelf_layers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shelf layer {} not found", id)))
    }

    pub async fn shelf_layer_create(&self, data: &ShelfLayerInput) -> AppResult<ShelfLayer> {
        self.bookshelf_get(data.bookshelf_id).await?;

        let row = sqlx::query_as::<_, ShelfLayer>(
            "INSERT INTO shelf_layers (bookshelf_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(data.bookshelf_id)
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn shelf_layer_update(
        &self,
        id: i64,
        data: &ShelfLayerInput,
    ) -> AppResult<ShelfLayer> {
        self.bookshelf_get(data.bookshelf_id).await?;

        sqlx::query_as::<_, ShelfLayer>(
            "UPDATE shelf_layers SET bookshelf_id = $1, name = $2, updated_at = $3 WHERE id = $4 RETURNING *",
        )
        .bind(data.bookshelf_id)
        .bind(&data.name)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shelf layer {} not found", id)))
    }

    /// Delete a shelf layer no book is shelved on
    pub async fn shelf_layer_delete(&self, id: i64) -> AppResult<()> {
        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE shelf_layer_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if books > 0 {
            return Err(AppError::Conflict(format!(
                "Shelf layer {} still holds {} book(s)",
                id, books
            )));
        }

        let result = sqlx::query("DELETE FROM shelf_layers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Shelf layer {} not found", id)));
        }
        Ok(())
    }
}
