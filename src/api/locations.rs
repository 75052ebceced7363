//! Storage location endpoints: areas, bookshelves, shelf layers and the tree

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::location::{
        Area, AreaInput, AreaNode, Bookshelf, BookshelfInput, BookshelfQuery, ShelfLayer,
        ShelfLayerInput, ShelfLayerQuery,
    },
};

// =============================================================================
// AREAS
// =============================================================================

/// List areas
#[utoipa::path(
    get,
    path = "/areas",
    tag = "locations",
    responses(
        (status = 200, description = "All areas in creation order", body = Vec<Area>)
    )
)]
pub async fn list_areas(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Area>>> {
    let rows = state.services.locations.list_areas().await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/areas/{id}",
    tag = "locations",
    params(("id" = i64, Path, description = "Area ID")),
    responses(
        (status = 200, description = "Area", body = Area),
        (status = 404, description = "Area not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_area(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Area>> {
    let row = state.services.locations.get_area(id).await?;
    Ok(Json(row))
}

/// Create an area
#[utoipa::path(
    post,
    path = "/areas",
    tag = "locations",
    request_body = AreaInput,
    responses(
        (status = 201, description = "Area created", body = Area),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Area name already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_area(
    State(state): State<crate::AppState>,
    Json(data): Json<AreaInput>,
) -> AppResult<(StatusCode, Json<Area>)> {
    let created = state.services.locations.create_area(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/areas/{id}",
    tag = "locations",
    params(("id" = i64, Path, description = "Area ID")),
    request_body = AreaInput,
    responses(
        (status = 200, description = "Area updated", body = Area),
        (status = 404, description = "Area not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Area name already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_area(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(data): Json<AreaInput>,
) -> AppResult<Json<Area>> {
    let updated = state.services.locations.update_area(id, data).await?;
    Ok(Json(updated))
}

/// Delete an empty area
#[utoipa::path(
    delete,
    path = "/areas/{id}",
    tag = "locations",
    params(("id" = i64, Path, description = "Area ID")),
    responses(
        (status = 204, description = "Area deleted"),
        (status = 404, description = "Area not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Area still has bookshelves", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_area(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.locations.delete_area(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// BOOKSHELVES
// =============================================================================

/// List bookshelves
#[utoipa::path(
    get,
    path = "/bookshelves",
    tag = "locations",
    params(BookshelfQuery),
    responses(
        (status = 200, description = "Bookshelves in creation order", body = Vec<Bookshelf>)
    )
)]
pub async fn list_bookshelves(
    State(state): State<crate::AppState>,
    Query(query): Query<BookshelfQuery>,
) -> AppResult<Json<Vec<Bookshelf>>> {
    let rows = state.services.locations.list_bookshelves(&query).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/bookshelves/{id}",
    tag = "locations",
    params(("id" = i64, Path, description = "Bookshelf ID")),
    responses(
        (status = 200, description = "Bookshelf", body = Bookshelf),
        (status = 404, description = "Bookshelf not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_bookshelf(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Bookshelf>> {
    let row = state.services.locations.get_bookshelf(id).await?;
    Ok(Json(row))
}

/// Create a bookshelf
#[utoipa::path(
    post,
    path = "/bookshelves",
    tag = "locations",
    request_body = BookshelfInput,
    responses(
        (status = 201, description = "Bookshelf created", body = Bookshelf),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Area not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_bookshelf(
    State(state): State<crate::AppState>,
    Json(data): Json<BookshelfInput>,
) -> AppResult<(StatusCode, Json<Bookshelf>)> {
    let created = state.services.locations.create_bookshelf(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/bookshelves/{id}",
    tag = "locations",
    params(("id" = i64, Path, description = "Bookshelf ID")),
    request_body = BookshelfInput,
    responses(
        (status = 200, description = "Bookshelf updated", body = Bookshelf),
        (status = 404, description = "Bookshelf or area not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_bookshelf(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(data): Json<BookshelfInput>,
) -> AppResult<Json<Bookshelf>> {
    let updated = state.services.locations.update_bookshelf(id, data).await?;
    Ok(Json(updated))
}

/// Delete an empty bookshelf
#[utoipa::path(
    delete,
    path = "/bookshelves/{id}",
    tag = "locations",
    params(("id" = i64, Path, description = "Bookshelf ID")),
    responses(
        (status = 204, description = "Bookshelf deleted"),
        (status = 404, description = "Bookshelf not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Bookshelf still has shelf layers", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_bookshelf(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.locations.delete_bookshelf(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// SHELF LAYERS
// =============================================================================

/// List shelf layers
#[utoipa::path(
    get,
    path = "/shelf-layers",
    tag = "locations",
    params(ShelfLayerQuery),
    responses(
        (status = 200, description = "Shelf layers in creation order", body = Vec<ShelfLayer>)
    )
)]
pub async fn list_shelf_layers(
    State(state): State<crate::AppState>,
    Query(query): Query<ShelfLayerQuery>,
) -> AppResult<Json<Vec<ShelfLayer>>> {
    let rows = state.services.locations.list_shelf_layers(&query).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/shelf-layers/{id}",
    tag = "locations",
    params(("id" = i64, Path, description = "Shelf layer ID")),
    responses(
        (status = 200, description = "Shelf layer", body = ShelfLayer),
        (status = 404, description = "Shelf layer not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_shelf_layer(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ShelfLayer>> {
    let row = state.services.locations.get_shelf_layer(id).await?;
    Ok(Json(row))
}

/// Create a shelf layer
#[utoipa::path(
    post,
    path = "/shelf-layers",
    tag = "locations",
    request_body = ShelfLayerInput,
    responses(
        (status = 201, description = "Shelf layer created", body = ShelfLayer),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Bookshelf not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_shelf_layer(
    State(state): State<crate::AppState>,
    Json(data): Json<ShelfLayerInput>,
) -> AppResult<(StatusCode, Json<ShelfLayer>)> {
    let created = state.services.locations.create_shelf_layer(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/shelf-layers/{id}",
    tag = "locations",
    params(("id" = i64, Path, description = "Shelf layer ID")),
    request_body = ShelfLayerInput,
    responses(
        (status = 200, description = "Shelf layer updated", body = ShelfLayer),
        (status = 404, description = "Shelf layer or bookshelf not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_shelf_layer(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(data): Json<ShelfLayerInput>,
) -> AppResult<Json<ShelfLayer>> {
    let updated = state.services.locations.update_shelf_layer(id, data).await?;
    Ok(Json(updated))
}

/// Delete an empty shelf layer
#[utoipa::path(
    delete,
    path = "/shelf-layers/{id}",
    tag = "locations",
    params(("id" = i64, Path, description = "Shelf layer ID")),
    responses(
        (status = 204, description = "Shelf layer deleted"),
        (status = 404, description = "Shelf layer not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Shelf layer still holds books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_shelf_layer(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.locations.delete_shelf_layer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Areas with their bookshelves and shelf layers
#[utoipa::path(
    get,
    path = "/locations/tree",
    tag = "locations",
    responses(
        (status = 200, description = "Location hierarchy", body = Vec<AreaNode>)
    )
)]
pub async fn location_tree(State(state): State<crate::AppState>) -> AppResult<Json<Vec<AreaNode>>> {
    let tree = state.services.locations.tree().await?;
    Ok(Json(tree))
}
