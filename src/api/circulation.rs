//! Direct borrow/return endpoints and circulation queries

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        borrow::{
            BorrowReceipt, BorrowRecordDetails, BorrowRecordQuery, DirectBorrow, DirectReturn,
            ReturnLine, ScanRequest, ScanResult,
        },
        borrower::BorrowerLoans,
    },
};

use super::{PaginatedBorrowRecords, PaginatedResponse};

/// Borrow a list of barcodes in one call
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "circulation",
    request_body = DirectBorrow,
    responses(
        (status = 201, description = "Borrow recorded", body = BorrowReceipt),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_direct(
    State(state): State<crate::AppState>,
    Json(request): Json<DirectBorrow>,
) -> AppResult<(StatusCode, Json<BorrowReceipt>)> {
    let receipt = state.services.circulation.borrow_direct(request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Return a list of barcodes in one call
#[utoipa::path(
    post,
    path = "/borrow/return",
    tag = "circulation",
    request_body = DirectReturn,
    responses(
        (status = 200, description = "Outcome per barcode", body = Vec<ReturnLine>),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_direct(
    State(state): State<crate::AppState>,
    Json(request): Json<DirectReturn>,
) -> AppResult<Json<Vec<ReturnLine>>> {
    let lines = state.services.circulation.return_direct(request).await?;
    Ok(Json(lines))
}

/// Take one copy out of stock (live scan feedback, no borrow record)
#[utoipa::path(
    post,
    path = "/borrow/scan",
    tag = "circulation",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Book state after the scan; only `barcode` for unknown books", body = ScanResult),
        (status = 400, description = "Missing or over-long barcode", body = crate::error::ErrorResponse)
    )
)]
pub async fn scan(
    State(state): State<crate::AppState>,
    Json(request): Json<ScanRequest>,
) -> AppResult<Json<ScanResult>> {
    request.validate()?;
    let result = state.services.circulation.scan(&request.barcode).await?;
    Ok(Json(result))
}

/// Search borrow records
#[utoipa::path(
    get,
    path = "/borrow/records",
    tag = "circulation",
    params(BorrowRecordQuery),
    responses(
        (status = 200, description = "Page of borrow records with their outstanding books", body = PaginatedBorrowRecords),
        (status = 400, description = "Invalid time range", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_records(
    State(state): State<crate::AppState>,
    Query(query): Query<BorrowRecordQuery>,
) -> AppResult<Json<PaginatedResponse<BorrowRecordDetails>>> {
    let (page, per_page) = (query.page, query.per_page);
    let (items, total) = state.services.circulation.list_records(query).await?;
    Ok(Json(PaginatedResponse::new(items, total, page, per_page)))
}

/// Books a phone number currently has out
#[utoipa::path(
    get,
    path = "/borrowers/{phone}/loans",
    tag = "circulation",
    params(("phone" = String, Path, description = "Borrower phone")),
    responses(
        (status = 200, description = "Outstanding books across active records", body = BorrowerLoans),
        (status = 404, description = "No active borrow for this phone", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrower_loans(
    State(state): State<crate::AppState>,
    Path(phone): Path<String>,
) -> AppResult<Json<BorrowerLoans>> {
    let loans = state.services.circulation.borrower_loans(&phone).await?;
    Ok(Json(loans))
}
