//! Staging cart endpoints for the borrow and return desks.
//!
//! Each slot is a single global cart: one staged user plus the barcodes
//! scanned so far, expiring two hours after the last write.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{BorrowReceipt, ReturnLine},
        cart::{AddCartItem, Cart, CartItem, CartSlot, CartUser},
    },
    AppState,
};

async fn set_user(state: &AppState, slot: CartSlot, user: CartUser) -> AppResult<Json<CartUser>> {
    let staged = state.services.staging.set_user(slot, user).await?;
    Ok(Json(staged))
}

async fn get_cart(state: &AppState, slot: CartSlot) -> AppResult<Json<Cart>> {
    let cart = state.services.staging.cart(slot).await?;
    Ok(Json(cart))
}

async fn add_item(
    state: &AppState,
    slot: CartSlot,
    body: AddCartItem,
) -> AppResult<(StatusCode, Json<CartItem>)> {
    body.validate()?;
    let item = state.services.staging.add_item(slot, &body.barcode).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Negative positions get the same error as positions past the end
fn cart_index(slot: CartSlot, index: i64) -> AppResult<usize> {
    usize::try_from(index).map_err(|_| {
        AppError::OutOfRange(format!("Index {} is outside the {} cart", index, slot))
    })
}

async fn remove_item(
    state: &AppState,
    slot: CartSlot,
    index: i64,
) -> AppResult<Json<Vec<CartItem>>> {
    let index = cart_index(slot, index)?;
    let remaining = state.services.staging.remove_item(slot, index).await?;
    Ok(Json(remaining))
}

// =============================================================================
// BORROW CART
// =============================================================================

/// Stage the borrower
#[utoipa::path(
    post,
    path = "/borrow/user",
    tag = "borrow-cart",
    request_body = CartUser,
    responses(
        (status = 200, description = "Borrower staged", body = CartUser),
        (status = 400, description = "Invalid name or phone", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_borrow_user(
    State(state): State<AppState>,
    Json(user): Json<CartUser>,
) -> AppResult<Json<CartUser>> {
    set_user(&state, CartSlot::Borrow, user).await
}

/// Staged borrower and scanned books
#[utoipa::path(
    get,
    path = "/borrow/user",
    tag = "borrow-cart",
    responses(
        (status = 200, description = "Borrow cart", body = Cart)
    )
)]
pub async fn get_borrow_cart(State(state): State<AppState>) -> AppResult<Json<Cart>> {
    get_cart(&state, CartSlot::Borrow).await
}

/// Scan a book into the borrow cart
#[utoipa::path(
    post,
    path = "/borrow/books",
    tag = "borrow-cart",
    request_body = AddCartItem,
    responses(
        (status = 201, description = "Book staged; name is set when the barcode is cataloged", body = CartItem),
        (status = 400, description = "No borrower staged", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_borrow_item(
    State(state): State<AppState>,
    Json(body): Json<AddCartItem>,
) -> AppResult<(StatusCode, Json<CartItem>)> {
    add_item(&state, CartSlot::Borrow, body).await
}

/// Remove a scanned book by its position
#[utoipa::path(
    delete,
    path = "/borrow/books/{index}",
    tag = "borrow-cart",
    params(("index" = i64, Path, description = "0-based position in scan order")),
    responses(
        (status = 200, description = "Remaining books in scan order", body = Vec<CartItem>),
        (status = 400, description = "Index out of range", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_borrow_item(
    State(state): State<AppState>,
    Path(index): Path<i64>,
) -> AppResult<Json<Vec<CartItem>>> {
    remove_item(&state, CartSlot::Borrow, index).await
}

/// Commit the borrow cart
#[utoipa::path(
    post,
    path = "/borrow/complete",
    tag = "borrow-cart",
    responses(
        (status = 201, description = "Borrow recorded and cart cleared", body = BorrowReceipt),
        (status = 400, description = "No borrower staged or empty cart", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_borrow(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<BorrowReceipt>)> {
    let receipt = state.services.circulation.complete_borrow().await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

// =============================================================================
// RETURN CART
// =============================================================================

/// Stage the person returning books
#[utoipa::path(
    post,
    path = "/return/user",
    tag = "return-cart",
    request_body = CartUser,
    responses(
        (status = 200, description = "Borrower staged", body = CartUser),
        (status = 400, description = "Invalid name or phone", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_return_user(
    State(state): State<AppState>,
    Json(user): Json<CartUser>,
) -> AppResult<Json<CartUser>> {
    set_user(&state, CartSlot::Return, user).await
}

#[utoipa::path(
    get,
    path = "/return/user",
    tag = "return-cart",
    responses(
        (status = 200, description = "Return cart", body = Cart)
    )
)]
pub async fn get_return_cart(State(state): State<AppState>) -> AppResult<Json<Cart>> {
    get_cart(&state, CartSlot::Return).await
}

#[utoipa::path(
    post,
    path = "/return/books",
    tag = "return-cart",
    request_body = AddCartItem,
    responses(
        (status = 201, description = "Book staged", body = CartItem),
        (status = 400, description = "No borrower staged", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_return_item(
    State(state): State<AppState>,
    Json(body): Json<AddCartItem>,
) -> AppResult<(StatusCode, Json<CartItem>)> {
    add_item(&state, CartSlot::Return, body).await
}

#[utoipa::path(
    delete,
    path = "/return/books/{index}",
    tag = "return-cart",
    params(("index" = i64, Path, description = "0-based position in scan order")),
    responses(
        (status = 200, description = "Remaining books in scan order", body = Vec<CartItem>),
        (status = 400, description = "Index out of range", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_return_item(
    State(state): State<AppState>,
    Path(index): Path<i64>,
) -> AppResult<Json<Vec<CartItem>>> {
    remove_item(&state, CartSlot::Return, index).await
}

/// Commit the return cart, one book at a time
#[utoipa::path(
    post,
    path = "/return/complete",
    tag = "return-cart",
    responses(
        (status = 200, description = "Outcome per staged barcode; the cart is cleared", body = Vec<ReturnLine>),
        (status = 400, description = "No borrower staged or empty cart", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_return(State(state): State<AppState>) -> AppResult<Json<Vec<ReturnLine>>> {
    let lines = state.services.circulation.complete_return().await?;
    Ok(Json(lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_index() {
        assert_eq!(cart_index(CartSlot::Borrow, 0).unwrap(), 0);
        assert_eq!(cart_index(CartSlot::Return, 4).unwrap(), 4);
        assert!(matches!(
            cart_index(CartSlot::Borrow, -1),
            Err(AppError::OutOfRange(_))
        ));
    }
}
