//! Storage locations: area -> bookshelf -> shelf layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Area (room, floor, zone...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Area {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create or rename an area
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AreaInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Bookshelf {
    pub id: i64,
    pub area_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create or replace a bookshelf
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookshelfInput {
    pub area_id: i64,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookshelfQuery {
    /// Only bookshelves of this area
    pub area_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ShelfLayer {
    pub id: i64,
    pub bookshelf_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create or replace a shelf layer
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ShelfLayerInput {
    pub bookshelf_id: i64,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShelfLayerQuery {
    /// Only layers of this bookshelf
    pub bookshelf_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Location tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShelfLayerNode {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookshelfNode {
    pub id: i64,
    pub name: String,
    pub shelf_layers: Vec<ShelfLayerNode>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AreaNode {
    pub id: i64,
    pub name: String,
    pub bookshelves: Vec<BookshelfNode>,
}
