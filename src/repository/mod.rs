//! Repository layer for database operations

pub mod books;
pub mod circulation;
pub mod locations;

use sqlx::{Pool, Postgres};

pub use circulation::CirculationStore;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub locations: locations::LocationsRepository,
    pub circulation: circulation::CirculationRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            locations: locations::LocationsRepository::new(pool.clone()),
            circulation: circulation::CirculationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database (readiness probe)
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
