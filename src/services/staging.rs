//! Staging carts: one user and an ordered list of scanned barcodes per slot

use std::sync::Arc;

use async_trait::async_trait;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::cart::{clean_barcode, Cart, CartItem, CartSlot, CartUser},
    repository::CirculationStore,
};

/// Ephemeral per-slot cart storage. Every write refreshes the slot's TTL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn set_user(&self, slot: CartSlot, user: CartUser) -> AppResult<()>;

    /// None when never set or expired
    async fn get_user(&self, slot: CartSlot) -> AppResult<Option<CartUser>>;

    /// Append at the end of the scan order
    async fn push_item(&self, slot: CartSlot, item: CartItem) -> AppResult<()>;

    /// Items oldest first
    async fn items(&self, slot: CartSlot) -> AppResult<Vec<CartItem>>;

    /// Remove the item at `index`; callers check the bounds first
    async fn remove_item(&self, slot: CartSlot, index: usize) -> AppResult<()>;

    /// Delete the user and the items; a no-op on an empty slot
    async fn clear(&self, slot: CartSlot) -> AppResult<()>;
}

#[derive(Clone)]
pub struct StagingService {
    carts: Arc<dyn CartStore>,
    circulation: Arc<dyn CirculationStore>,
}

impl StagingService {
    pub fn new(carts: Arc<dyn CartStore>, circulation: Arc<dyn CirculationStore>) -> Self {
        Self { carts, circulation }
    }

    /// Replace the slot's user
    pub async fn set_user(&self, slot: CartSlot, user: CartUser) -> AppResult<CartUser> {
        user.validate()?;
        self.carts.set_user(slot, user.clone()).await?;
        tracing::debug!(%slot, phone = %user.phone, "Cart user staged");
        Ok(user)
    }

    pub async fn get_user(&self, slot: CartSlot) -> AppResult<Option<CartUser>> {
        self.carts.get_user(slot).await
    }

    /// User and items; items are only shown while a user is staged
    pub async fn cart(&self, slot: CartSlot) -> AppResult<Cart> {
        let user = self.carts.get_user(slot).await?;
        let items = match user {
            Some(_) => self.carts.items(slot).await?,
            None => Vec::new(),
        };
        Ok(Cart { user, items })
    }

    /// Stage a scanned barcode. The book name is looked up best-effort.
    pub async fn add_item(&self, slot: CartSlot, barcode: &str) -> AppResult<CartItem> {
        let barcode = clean_barcode(barcode)?;
        if self.carts.get_user(slot).await?.is_none() {
            return Err(AppError::Validation(format!(
                "No user staged for the {} cart",
                slot
            )));
        }

        let name = match self.circulation.find_book_by_barcode(barcode.to_string()).await {
            Ok(book) => book.map(|b| b.name),
            Err(e) => {
                tracing::warn!(%slot, barcode, "Book lookup failed while staging: {}", e);
                None
            }
        };

        let item = CartItem {
            barcode: barcode.to_string(),
            name,
        };
        self.carts.push_item(slot, item.clone()).await?;
        Ok(item)
    }

    pub async fn list_items(&self, slot: CartSlot) -> AppResult<Vec<CartItem>> {
        self.carts.items(slot).await
    }

    /// Remove the item at a 0-based scan position and return what is left
    pub async fn remove_item(&self, slot: CartSlot, index: usize) -> AppResult<Vec<CartItem>> {
        let items = self.carts.items(slot).await?;
        if index >= items.len() {
            return Err(AppError::OutOfRange(format!(
                "Index {} is outside the {} cart ({} item(s))",
                index,
                slot,
                items.len()
            )));
        }

        self.carts.remove_item(slot, index).await?;
        self.carts.items(slot).await
    }

    pub async fn clear(&self, slot: CartSlot) -> AppResult<()> {
        self.carts.clear(slot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::Book;
    use crate::repository::circulation::MockCirculationStore;
    use chrono::Utc;
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn user() -> CartUser {
        CartUser {
            name: "Ada".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    fn item(barcode: &str) -> CartItem {
        CartItem {
            barcode: barcode.to_string(),
            name: None,
        }
    }

    fn book(barcode: &str, name: &str) -> Book {
        let now = Utc::now();
        Book {
            id: 1,
            barcode: barcode.to_string(),
            name: name.to_string(),
            quantity: 2,
            in_stock: 2,
            shelf_layer_id: None,
            price: None,
            remark: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(carts: MockCartStore, circulation: MockCirculationStore) -> StagingService {
        StagingService::new(Arc::new(carts), Arc::new(circulation))
    }

    #[tokio::test]
    async fn test_add_item_requires_user() {
        let mut carts = MockCartStore::new();
        carts.expect_get_user().returning(|_| Ok(None));
        carts.expect_push_item().never();

        let svc = service(carts, MockCirculationStore::new());
        let err = svc.add_item(CartSlot::Borrow, "BC1").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_item_rejects_over_long_barcode() {
        let mut carts = MockCartStore::new();
        carts.expect_get_user().never();
        carts.expect_push_item().never();

        let mut circulation = MockCirculationStore::new();
        circulation.expect_find_book_by_barcode().never();

        let svc = service(carts, circulation);
        let err = svc
            .add_item(CartSlot::Borrow, &"X".repeat(150))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_item_resolves_name() {
        let mut carts = MockCartStore::new();
        carts.expect_get_user().returning(|_| Ok(Some(user())));
        carts
            .expect_push_item()
            .withf(|slot, item| {
                *slot == CartSlot::Borrow
                    && item.barcode == "BC1"
                    && item.name.as_deref() == Some("Dune")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut circulation = MockCirculationStore::new();
        circulation
            .expect_find_book_by_barcode()
            .with(eq("BC1".to_string()))
            .returning(|_| Ok(Some(book("BC1", "Dune"))));

        let svc = service(carts, circulation);
        let added = assert_ok!(svc.add_item(CartSlot::Borrow, " BC1 ").await);
        assert_eq!(added.name.as_deref(), Some("Dune"));
    }

    #[tokio::test]
    async fn test_add_item_keeps_unknown_barcode() {
        let mut carts = MockCartStore::new();
        carts.expect_get_user().returning(|_| Ok(Some(user())));
        carts
            .expect_push_item()
            .withf(|_, item| item.barcode == "BC2" && item.name.is_none())
            .times(1)
            .returning(|_, _| Ok(()));

        let mut circulation = MockCirculationStore::new();
        circulation
            .expect_find_book_by_barcode()
            .returning(|_| Err(AppError::Internal("catalog down".to_string())));

        let svc = service(carts, circulation);
        let added = assert_ok!(svc.add_item(CartSlot::Borrow, "BC2").await);
        assert_eq!(added, item("BC2"));
    }

    #[tokio::test]
    async fn test_remove_item_returns_remaining_order() {
        let mut carts = MockCartStore::new();
        let mut seq = mockall::Sequence::new();
        carts
            .expect_items()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![item("A"), item("B"), item("C")]));
        carts
            .expect_remove_item()
            .with(eq(CartSlot::Borrow), eq(1usize))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        carts
            .expect_items()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![item("A"), item("C")]));

        let svc = service(carts, MockCirculationStore::new());
        let remaining = assert_ok!(svc.remove_item(CartSlot::Borrow, 1).await);
        assert_eq!(remaining, vec![item("A"), item("C")]);
    }

    #[tokio::test]
    async fn test_remove_item_out_of_range() {
        let mut carts = MockCartStore::new();
        carts
            .expect_items()
            .returning(|_| Ok(vec![item("A"), item("C")]));
        carts.expect_remove_item().never();

        let svc = service(carts, MockCirculationStore::new());
        let err = svc.remove_item(CartSlot::Borrow, 5).await.unwrap_err();
        assert!(matches!(err, AppError::OutOfRange(_)));
    }

    #[tokio::test]
    async fn test_cart_hides_items_without_user() {
        let mut carts = MockCartStore::new();
        carts.expect_get_user().returning(|_| Ok(None));
        carts.expect_items().never();

        let svc = service(carts, MockCirculationStore::new());
        let cart = assert_ok!(svc.cart(CartSlot::Return).await);
        assert!(cart.user.is_none());
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn test_set_user_rejects_blank_phone() {
        let mut carts = MockCartStore::new();
        carts.expect_set_user().never();

        let svc = service(carts, MockCirculationStore::new());
        let blank = CartUser {
            name: "Ada".to_string(),
            phone: String::new(),
        };
        assert_err!(svc.set_user(CartSlot::Borrow, blank).await);
    }

    #[tokio::test]
    async fn test_clear_empty_slot() {
        let mut carts = MockCartStore::new();
        carts
            .expect_clear()
            .with(eq(CartSlot::Return))
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(carts, MockCirculationStore::new());
        assert_ok!(svc.clear(CartSlot::Return).await);
    }
}
