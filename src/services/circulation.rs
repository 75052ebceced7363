//! Borrow and return workflows: staged commits, direct variants and queries

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{
            BorrowReceipt, BorrowRecordDetails, BorrowRecordQuery, DirectBorrow, DirectReturn,
            ReturnLine, ReturnStatus, ScanResult,
        },
        borrower::BorrowerLoans,
        cart::{clean_barcode, CartSlot, CartUser},
    },
    repository::CirculationStore,
    services::staging::CartStore,
};

#[derive(Clone)]
pub struct CirculationService {
    carts: Arc<dyn CartStore>,
    circulation: Arc<dyn CirculationStore>,
}

impl CirculationService {
    pub fn new(carts: Arc<dyn CartStore>, circulation: Arc<dyn CirculationStore>) -> Self {
        Self { carts, circulation }
    }

    /// Staged user and barcodes of a slot; both must be present
    async fn staged(&self, slot: CartSlot) -> AppResult<(CartUser, Vec<String>)> {
        let user = self.carts.get_user(slot).await?.ok_or_else(|| {
            AppError::Validation(format!("No user staged for the {} cart", slot))
        })?;

        let items = self.carts.items(slot).await?;
        if items.is_empty() {
            return Err(AppError::Validation(format!("The {} cart is empty", slot)));
        }

        Ok((user, items.into_iter().map(|i| i.barcode).collect()))
    }

    async fn clear_after_commit(&self, slot: CartSlot) {
        if let Err(e) = self.carts.clear(slot).await {
            tracing::error!(%slot, "Commit succeeded but the cart could not be cleared: {}", e);
        }
    }

    /// Commit the staged borrow cart in one transaction, then clear it
    pub async fn complete_borrow(&self) -> AppResult<BorrowReceipt> {
        let (user, barcodes) = self.staged(CartSlot::Borrow).await?;
        let receipt = self.circulation.commit_borrow(user, barcodes).await?;
        self.clear_after_commit(CartSlot::Borrow).await;
        Ok(receipt)
    }

    /// Borrow without staging
    pub async fn borrow_direct(&self, request: DirectBorrow) -> AppResult<BorrowReceipt> {
        request.validate()?;
        let barcodes = clean_barcodes(request.barcodes)?;
        let borrower = CartUser {
            name: request.borrower_name,
            phone: request.borrower_phone,
        };
        self.circulation.commit_borrow(borrower, barcodes).await
    }

    /// Return every staged barcode, one transaction each, then clear the cart
    pub async fn complete_return(&self) -> AppResult<Vec<ReturnLine>> {
        let (user, barcodes) = self.staged(CartSlot::Return).await?;
        self.circulation.upsert_borrower(user.clone()).await?;

        let lines = self.return_batch(&user.phone, barcodes).await;
        self.clear_after_commit(CartSlot::Return).await;
        Ok(lines)
    }

    /// Return without staging
    pub async fn return_direct(&self, request: DirectReturn) -> AppResult<Vec<ReturnLine>> {
        request.validate()?;
        let barcodes = clean_barcodes(request.barcodes)?;
        Ok(self.return_batch(&request.borrower_phone, barcodes).await)
    }

    async fn return_batch(&self, phone: &str, barcodes: Vec<String>) -> Vec<ReturnLine> {
        let mut lines = Vec::with_capacity(barcodes.len());

        for barcode in barcodes {
            let line = match self
                .circulation
                .return_item(phone.to_string(), barcode.clone())
                .await
            {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!(%barcode, phone, "Return failed: {}", e);
                    ReturnLine::failed(&barcode, failure_message(&e))
                }
            };
            lines.push(line);
        }

        let returned = lines
            .iter()
            .filter(|l| l.status == ReturnStatus::Returned)
            .count();
        tracing::info!(phone, returned, total = lines.len(), "Return batch processed");

        lines
    }

    /// Take one copy off the shelf without recording a borrow
    pub async fn scan(&self, barcode: &str) -> AppResult<ScanResult> {
        let barcode = clean_barcode(barcode)?;
        self.circulation.scan_out(barcode.to_string()).await
    }

    pub async fn list_records(
        &self,
        query: BorrowRecordQuery,
    ) -> AppResult<(Vec<BorrowRecordDetails>, i64)> {
        if let (Some(start), Some(end)) = (query.start_time, query.end_time) {
            if start > end {
                return Err(AppError::Validation(
                    "start_time must not be after end_time".to_string(),
                ));
            }
        }
        self.circulation.list_records(query).await
    }

    pub async fn borrower_loans(&self, phone: &str) -> AppResult<BorrowerLoans> {
        self.circulation.borrower_loans(phone.to_string()).await
    }
}

/// Blank entries are dropped; an over-long one rejects the whole request
fn clean_barcodes(barcodes: Vec<String>) -> AppResult<Vec<String>> {
    let cleaned = barcodes
        .iter()
        .filter(|b| !b.trim().is_empty())
        .map(|b| clean_barcode(b).map(str::to_string))
        .collect::<AppResult<Vec<String>>>()?;
    if cleaned.is_empty() {
        return Err(AppError::Validation("At least one barcode is required".to_string()));
    }
    Ok(cleaned)
}

fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Database(_) | AppError::Cache(_) => "Store error, item not returned".to_string(),
        other => other.to_string(),
    }
}
